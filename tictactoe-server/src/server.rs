//! 服务器主逻辑
//!
//! 一个协调任务独占 [`ServerState`]，所有注册、走棋、重置和断线都以
//! [`Command`] 的形式排队交给它逐条处理，因此回合检查与落子之间不会
//! 插入其他连接的修改。每个连接各有一个读循环和一个写任务。

use std::future::Future;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use protocol::{
    ClientMessage, Connection, Listener, PlayerId, Position, ProtocolError, ServerMessage,
    TcpConnection, TcpListener,
};

use crate::config::ServerConfig;
use crate::session::{Session, SessionSnapshot};

/// 协调任务命令队列容量
const COMMAND_BUFFER: usize = 256;

/// 服务器状态（只由协调任务持有）
pub struct ServerState {
    pub session: Session,
    pub max_participants: Option<usize>,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            session: Session::new(),
            max_participants: config.max_participants,
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(&ServerConfig::default())
    }
}

/// 发往协调任务的命令
#[derive(Debug)]
pub enum Command {
    /// 注册新连接，回复分配的 ID；超过人数上限时回复 `None`
    Register {
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    /// 客户端消息
    Client {
        player_id: PlayerId,
        msg: ClientMessage,
    },
    /// 连接断开
    Disconnect { player_id: PlayerId },
    /// 获取对局快照
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// 消息处理器
pub struct MessageHandler;

impl MessageHandler {
    /// 处理一条命令
    ///
    /// 不会等待任何连接：消息投递用 `try_send`，队列满的参与者直接移除。
    pub fn handle(state: &mut ServerState, cmd: Command) {
        match cmd {
            Command::Register {
                sender,
                peer_addr,
                reply,
            } => {
                let player_id = Self::handle_register(state, sender, peer_addr);
                let _ = reply.send(player_id);
            }
            Command::Client { player_id, msg } => {
                Self::handle_client_message(state, player_id, msg);
            }
            Command::Disconnect { player_id } => {
                Self::handle_disconnect(state, player_id);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(state.session.snapshot());
            }
        }
    }

    /// 处理注册
    fn handle_register(
        state: &mut ServerState,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> Option<PlayerId> {
        if let Some(max) = state.max_participants {
            if state.session.players().online_count() >= max {
                warn!(?peer_addr, max, "participant limit reached, rejecting connection");
                return None;
            }
        }

        let player_id = state.session.register_participant(sender, peer_addr);
        // 连接收到的第一条消息永远是分配的 ID
        state
            .session
            .send_to(player_id, ServerMessage::Welcome { player_id })
            .then_some(player_id)
    }

    /// 处理客户端消息
    fn handle_client_message(state: &mut ServerState, player_id: PlayerId, msg: ClientMessage) {
        // 已被移除的连接可能还有排队中的消息
        if !state.session.players().exists(player_id) {
            debug!(player = player_id, ?msg, "message from removed participant ignored");
            return;
        }

        let pending = match msg {
            ClientMessage::MakeMove { pos } => state.session.submit_move(player_id, pos),
            ClientMessage::Reset => {
                info!(player = player_id, "reset requested");
                state.session.reset()
            }
        };

        state.session.broadcast(&pending);
    }

    /// 处理玩家断线
    fn handle_disconnect(state: &mut ServerState, player_id: PlayerId) {
        state.session.remove_participant(player_id);
    }
}

/// 协调任务句柄
///
/// 只暴露注册、走棋、重置、断线几个原子操作。
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// 启动协调任务
    pub fn spawn(state: ServerState) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(async move {
            let mut state = state;
            while let Some(cmd) = rx.recv().await {
                MessageHandler::handle(&mut state, cmd);
            }
            debug!("coordinator stopped");
        });
        (Self { tx }, task)
    }

    /// 注册参与者
    pub async fn register(
        &self,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> anyhow::Result<Option<PlayerId>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Register {
            sender,
            peer_addr,
            reply,
        })
        .await?;
        Ok(rx.await?)
    }

    /// 提交走棋
    pub async fn submit_move(&self, player_id: PlayerId, pos: Position) -> anyhow::Result<()> {
        self.client_message(player_id, ClientMessage::MakeMove { pos })
            .await
    }

    /// 请求重置棋盘
    pub async fn reset(&self, player_id: PlayerId) -> anyhow::Result<()> {
        self.client_message(player_id, ClientMessage::Reset).await
    }

    /// 转发客户端消息
    pub async fn client_message(&self, player_id: PlayerId, msg: ClientMessage) -> anyhow::Result<()> {
        self.send(Command::Client { player_id, msg }).await
    }

    /// 通知连接断开
    pub async fn disconnect(&self, player_id: PlayerId) -> anyhow::Result<()> {
        self.send(Command::Disconnect { player_id }).await
    }

    /// 获取对局快照
    pub async fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        Ok(rx.await?)
    }

    async fn send(&self, cmd: Command) -> anyhow::Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow!("coordinator stopped"))
    }
}

/// 井字棋服务器
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
}

impl Server {
    /// 绑定监听地址
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.network.addr()).await?;
        Ok(Self { config, listener })
    }

    /// 实际监听地址（端口为 0 时可用来获取分配的端口）
    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    /// 运行接受循环，直到 `shutdown` 完成
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        let Server {
            config,
            mut listener,
        } = self;
        let (handle, coordinator) = SessionHandle::spawn(ServerState::new(&config));

        info!(addr = ?listener.local_addr(), "server listening");

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(conn) => {
                        let handle = handle.clone();
                        let buffer = config.outbound_buffer;
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(conn, handle, buffer).await {
                                warn!(error = %e, "connection task failed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
                // 回收已结束的连接任务
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        // 连接任务和协调任务一并停止；协调任务释放发送端后写任务随之退出
        connections.abort_all();
        coordinator.abort();
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

/// 是否为对端发送了非法数据（而不是单纯的 IO 失败）
fn is_protocol_violation(e: &ProtocolError) -> bool {
    matches!(
        e,
        ProtocolError::Malformed { .. }
            | ProtocolError::InvalidPosition { .. }
            | ProtocolError::InvalidUtf8(_)
            | ProtocolError::FrameTooLarge { .. }
    )
}

/// 处理单个连接：注册、启动写任务、运行读循环，结束时移除参与者
pub async fn handle_connection(
    conn: TcpConnection,
    handle: SessionHandle,
    outbound_buffer: usize,
) -> anyhow::Result<()> {
    let peer_addr = conn.peer_addr();
    let (mut reader, mut writer) = conn.split();
    let (tx, mut rx) = mpsc::channel(outbound_buffer.max(1));

    let Some(player_id) = handle.register(tx, peer_addr.clone()).await? else {
        info!(?peer_addr, "connection rejected");
        return Ok(());
    };
    info!(player = player_id, ?peer_addr, "connection accepted");

    // 写任务：参与者被移除后发送端被丢弃，recv 返回 None
    let writer_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = writer.send(&msg).await {
                debug!(player = player_id, error = %e, "write failed");
                break;
            }
        }
    });

    // 读循环：每帧一条消息
    let result = loop {
        match reader.recv::<ClientMessage>().await {
            Ok(msg) => handle.client_message(player_id, msg).await?,
            Err(ProtocolError::ConnectionClosed) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    match &result {
        Ok(()) => info!(player = player_id, "connection closed"),
        Err(e) if is_protocol_violation(e) => {
            warn!(player = player_id, error = %e, "protocol error, dropping connection")
        }
        Err(e) => info!(player = player_id, error = %e, "connection lost"),
    }

    handle.disconnect(player_id).await?;
    let _ = writer_task.await;
    Ok(())
}
