//! 自动对手
//!
//! 订阅快照，轮到自己时用 AI 引擎选一步并通过网络提交。

use protocol::Position;
use tictactoe_ai::{AiConfig, AiEngine, Difficulty};
use tracing::{debug, info};

use super::{GameOutcome, GameSnapshot};
use crate::network::NetworkConnection;

/// 自动对手
pub struct BotPlayer {
    engine: AiEngine,
    /// 上一次提交走棋时的快照版本，避免对同一局面重复提交
    last_submitted: Option<u64>,
    /// 已计入的结束局数
    rounds_seen: u64,
}

impl BotPlayer {
    /// 用服务端分配的 ID 和难度等级创建
    pub fn new(player_id: protocol::PlayerId, level: u8) -> Self {
        Self::with_engine(AiEngine::new(AiConfig {
            difficulty: Difficulty::from_level(level),
            player: player_id,
        }))
    }

    pub fn with_engine(engine: AiEngine) -> Self {
        Self {
            engine,
            last_submitted: None,
            rounds_seen: 0,
        }
    }

    /// 根据快照决定是否走棋
    pub fn choose(&mut self, snapshot: &GameSnapshot) -> Option<Position> {
        if !snapshot.is_my_turn() || self.last_submitted == Some(snapshot.version) {
            return None;
        }
        let pos = self.engine.decide(&snapshot.board)?;
        self.last_submitted = Some(snapshot.version);
        debug!(%pos, nodes = self.engine.nodes_searched(), "bot chose move");
        Some(pos)
    }

    /// 返回自上次调用以来新结束的局数
    ///
    /// 快照可能被合并，只看 `last_outcome` 会漏掉紧跟着新一局落子的胜局。
    pub fn note_finished(&mut self, snapshot: &GameSnapshot) -> u64 {
        let new = snapshot.rounds_finished.saturating_sub(self.rounds_seen);
        self.rounds_seen = self.rounds_seen.max(snapshot.rounds_finished);
        new
    }

    /// 持续对局，直到连接断开；`rounds` 为 Some(n) 时完成 n 局后返回
    pub async fn run(mut self, conn: &NetworkConnection, rounds: Option<usize>) -> anyhow::Result<()> {
        let mut updates = conn.subscribe();
        let mut finished = 0;

        loop {
            let snapshot = updates.borrow_and_update().clone();
            if !snapshot.connected {
                info!("connection closed, bot stopping");
                return Ok(());
            }

            let new_rounds = self.note_finished(&snapshot);
            if new_rounds > 0 {
                finished += new_rounds;
                info!(outcome = ?snapshot.last_outcome, finished, "round finished");
                if rounds.is_some_and(|n| finished >= n as u64) {
                    return Ok(());
                }
                // 平局后棋盘不会自动清空，由走最后一步的一方请求重置
                if snapshot.last_outcome == Some(GameOutcome::Draw)
                    && snapshot.current_turn == snapshot.player_id
                {
                    conn.send_reset().await?;
                }
            }

            if let Some(pos) = self.choose(&snapshot) {
                conn.send_move(pos).await?;
            }

            if updates.changed().await.is_err() {
                return Ok(());
            }
        }
    }
}
