//! 网络连接管理
//!
//! 使用 protocol 库的传输层抽象

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use protocol::{
    ClientMessage, Connector, FrameReader, FrameWriter, PlayerId, Position, ProtocolError,
    ServerMessage, TcpConnector, CONNECT_TIMEOUT,
};

use crate::game::{ClientGame, GameSnapshot};

/// 网络连接
///
/// 连接建立后后台任务持续接收广播并更新本地棋盘镜像，每次更新都
/// 通过 watch 通道发布新的快照。
pub struct NetworkConnection {
    player_id: PlayerId,
    /// 写半部（发送走棋/重置）
    writer: Mutex<FrameWriter<OwnedWriteHalf>>,
    /// 最新快照
    snapshot: watch::Receiver<GameSnapshot>,
    /// 接收任务
    receiver: JoinHandle<()>,
}

impl NetworkConnection {
    /// 连接到服务器并等待分配 ID
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let conn = TcpConnector.connect(addr).await?;
        let (mut reader, writer) = conn.split();

        // 第一条消息是服务端分配的 ID
        let first = timeout(CONNECT_TIMEOUT, reader.recv::<ServerMessage>())
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)??;
        let ServerMessage::Welcome { player_id } = first else {
            anyhow::bail!("expected player id from server, got {:?}", first);
        };
        tracing::info!("Connected to server {} as player {}", addr, player_id);

        let game = ClientGame::new(player_id);
        let (tx, snapshot) = watch::channel(game.snapshot());
        let receiver = tokio::spawn(receive_loop(reader, game, tx));

        Ok(Self {
            player_id,
            writer: Mutex::new(writer),
            snapshot,
            receiver,
        })
    }

    /// 服务端分配的 ID
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// 发送走棋意图（是否生效由服务端决定）
    pub async fn send_move(&self, pos: Position) -> anyhow::Result<()> {
        self.send(&ClientMessage::MakeMove { pos }).await
    }

    /// 请求重置棋盘
    pub async fn send_reset(&self) -> anyhow::Result<()> {
        self.send(&ClientMessage::Reset).await
    }

    async fn send(&self, msg: &ClientMessage) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.send(msg).await?;
        tracing::debug!("Sent {:?}", msg);
        Ok(())
    }

    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot.clone()
    }

    /// 当前快照
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot.borrow().clone()
    }

    /// 检查是否已连接
    pub fn is_connected(&self) -> bool {
        self.snapshot.borrow().connected
    }
}

impl Drop for NetworkConnection {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}

/// 接收循环：把广播应用到本地镜像并发布快照
async fn receive_loop(
    mut reader: FrameReader<OwnedReadHalf>,
    mut game: ClientGame,
    tx: watch::Sender<GameSnapshot>,
) {
    loop {
        match reader.recv::<ServerMessage>().await {
            Ok(msg) => {
                tracing::debug!("Received {:?}", msg);
                game.apply(&msg);
                tx.send_replace(game.snapshot());
            }
            Err(ProtocolError::ConnectionClosed) => {
                tracing::info!("Server closed the connection");
                break;
            }
            Err(e) => {
                tracing::warn!("Receive error: {}", e);
                break;
            }
        }
    }

    game.set_disconnected();
    tx.send_replace(game.snapshot());
}
