//! 玩家管理

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use protocol::{PlayerId, ServerMessage};

/// 已连接的参与者
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: PlayerId,
    /// 远端地址（仅用于日志）
    pub peer_addr: Option<String>,
    /// 发往该连接写任务的消息通道
    sender: mpsc::Sender<ServerMessage>,
}

impl Participant {
    pub fn new(id: PlayerId, sender: mpsc::Sender<ServerMessage>, peer_addr: Option<String>) -> Self {
        Self {
            id,
            peer_addr,
            sender,
        }
    }

    /// 投递消息，不等待
    ///
    /// 写任务已退出或发送队列已满时返回 false。队列满说明对端长期不读，
    /// 调用方应移除该参与者，协调任务不能因为单个连接而阻塞。
    pub fn send(&self, msg: ServerMessage) -> bool {
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(player = self.id, "outbound queue full, dropping participant");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// 玩家管理器
///
/// 按连接顺序保存参与者。ID 从 1 开始递增，断线后不会复用。
#[derive(Debug)]
pub struct PlayerManager {
    participants: Vec<Participant>,
    /// 下一个待分配的 ID
    next_id: PlayerId,
}

impl PlayerManager {
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
            next_id: 1,
        }
    }

    /// 生成新的玩家 ID
    fn generate_id(&mut self) -> PlayerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 注册参与者，返回分配的 ID
    pub fn register(
        &mut self,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> PlayerId {
        let id = self.generate_id();
        self.participants.push(Participant::new(id, sender, peer_addr));
        id
    }

    /// 移除参与者
    pub fn remove(&mut self, player_id: PlayerId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == player_id)?;
        Some(self.participants.remove(index))
    }

    /// 获取参与者
    pub fn get(&self, player_id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == player_id)
    }

    /// 检查参与者是否存在
    pub fn exists(&self, player_id: PlayerId) -> bool {
        self.get(player_id).is_some()
    }

    /// 在线参与者数量
    pub fn online_count(&self) -> usize {
        self.participants.len()
    }

    /// 按连接顺序列出所有 ID
    pub fn ids(&self) -> Vec<PlayerId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// 发送消息给单个参与者
    pub fn send_to(&self, player_id: PlayerId, msg: ServerMessage) -> bool {
        match self.get(player_id) {
            Some(participant) => participant.send(msg),
            None => false,
        }
    }

    /// 按顺序把消息发给所有参与者，返回投递失败的 ID
    pub fn broadcast(&self, messages: &[ServerMessage]) -> Vec<PlayerId> {
        let mut failed = Vec::new();
        for participant in &self.participants {
            for msg in messages {
                if !participant.send(*msg) {
                    failed.push(participant.id);
                    break;
                }
            }
        }
        failed
    }
}

impl Default for PlayerManager {
    fn default() -> Self {
        Self::new()
    }
}
