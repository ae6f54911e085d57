//! 对局控制
//!
//! `Session` 持有唯一的实盘、回合指针和参与者表。所有方法都是同步的，
//! 返回需要广播的消息；投递由 [`Session::broadcast`] 统一完成。

use tokio::sync::mpsc;
use tracing::{debug, info};

use protocol::{Board, PlayerId, Position, ServerMessage, FIRST_PLAYER, SECOND_PLAYER};

use crate::player::PlayerManager;

/// 一局的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 玩家连成一线
    Win(PlayerId),
    /// 满盘无人获胜
    Draw,
}

/// 对局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 等待第二名玩家
    WaitingForParticipants,
    /// 对局进行中
    InProgress,
    /// 已分胜负或和棋；获胜后会立即开始新一局，和棋停留到显式重置
    Terminal(Outcome),
}

/// 对局状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub board: Board,
    pub current_turn: PlayerId,
    pub phase: SessionPhase,
    pub last_outcome: Option<Outcome>,
    pub participants: Vec<PlayerId>,
}

/// 对局
#[derive(Debug)]
pub struct Session {
    board: Board,
    current_turn: PlayerId,
    phase: SessionPhase,
    last_outcome: Option<Outcome>,
    players: PlayerManager,
}

impl Session {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_turn: FIRST_PLAYER,
            phase: SessionPhase::WaitingForParticipants,
            last_outcome: None,
            players: PlayerManager::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> PlayerId {
        self.current_turn
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn players(&self) -> &PlayerManager {
        &self.players
    }

    /// 获取状态快照
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board,
            current_turn: self.current_turn,
            phase: self.phase,
            last_outcome: self.last_outcome,
            participants: self.players.ids(),
        }
    }

    /// 注册参与者
    ///
    /// ID 按到达顺序分配。3 号及以后的参与者会收到广播，但回合指针
    /// 只在 1 和 2 之间切换，所以他们永远轮不到。
    pub fn register_participant(
        &mut self,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> PlayerId {
        let id = self.players.register(sender, peer_addr);
        if self.phase == SessionPhase::WaitingForParticipants && id >= SECOND_PLAYER {
            self.phase = SessionPhase::InProgress;
        }
        info!(player = id, online = self.players.online_count(), "participant joined");
        id
    }

    /// 移除参与者
    pub fn remove_participant(&mut self, player_id: PlayerId) -> bool {
        let removed = self.players.remove(player_id).is_some();
        if removed {
            info!(
                player = player_id,
                online = self.players.online_count(),
                "participant left"
            );
        }
        removed
    }

    /// 提交走棋
    ///
    /// 不是该玩家的回合或格子已被占时静默丢弃，返回空列表，棋盘和回合
    /// 都不变。
    pub fn submit_move(&mut self, player: PlayerId, pos: Position) -> Vec<ServerMessage> {
        if player != self.current_turn || !self.board.is_available(pos) {
            debug!(player, %pos, current_turn = self.current_turn, "move dropped");
            return Vec::new();
        }

        self.board.mark(pos, player);
        if self.phase == SessionPhase::WaitingForParticipants {
            self.phase = SessionPhase::InProgress;
        }
        debug!(player, %pos, "move committed");

        let mut pending = vec![ServerMessage::MoveMade { player, pos }];

        if self.board.check_win(player) {
            info!(player, "player wins");
            pending.push(ServerMessage::Win { player });
            self.finish(Outcome::Win(player));
            // win 消息本身就意味着重置，不再单独广播 reset
            self.start_round();
        } else if self.board.is_full() {
            info!("board full, draw");
            pending.push(ServerMessage::Draw);
            self.finish(Outcome::Draw);
        } else {
            self.switch_turn();
        }

        pending
    }

    /// 重置棋盘
    pub fn reset(&mut self) -> Vec<ServerMessage> {
        info!("board reset");
        self.start_round();
        vec![ServerMessage::Reset]
    }

    /// 把消息按顺序发给所有参与者，投递失败的参与者会被移除
    pub fn broadcast(&mut self, messages: &[ServerMessage]) {
        if messages.is_empty() {
            return;
        }
        for player_id in self.players.broadcast(messages) {
            self.remove_participant(player_id);
        }
    }

    /// 发送消息给单个参与者，失败时移除该参与者
    pub fn send_to(&mut self, player_id: PlayerId, msg: ServerMessage) -> bool {
        let delivered = self.players.send_to(player_id, msg);
        if !delivered {
            self.remove_participant(player_id);
        }
        delivered
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = SessionPhase::Terminal(outcome);
        self.last_outcome = Some(outcome);
    }

    /// 新的一局：空棋盘，1 号先手
    fn start_round(&mut self) {
        self.board = Board::new();
        self.current_turn = FIRST_PLAYER;
        if self.phase != SessionPhase::WaitingForParticipants {
            self.phase = SessionPhase::InProgress;
        }
    }

    fn switch_turn(&mut self) {
        self.current_turn = if self.current_turn == FIRST_PLAYER {
            SECOND_PLAYER
        } else {
            FIRST_PLAYER
        };
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col).unwrap()
    }

    fn moved(player: PlayerId, row: u8, col: u8) -> ServerMessage {
        ServerMessage::MoveMade {
            player,
            pos: pos(row, col),
        }
    }

    /// 注册两名参与者，返回各自的接收端
    fn two_player_session() -> (
        Session,
        mpsc::Receiver<ServerMessage>,
        mpsc::Receiver<ServerMessage>,
    ) {
        let mut session = Session::new();
        let (tx1, rx1) = mpsc::channel(32);
        let (tx2, rx2) = mpsc::channel(32);
        assert_eq!(session.register_participant(tx1, None), 1);
        assert_eq!(session.register_participant(tx2, None), 2);
        (session, rx1, rx2)
    }

    #[test]
    fn test_phase_waits_for_second_participant() {
        let mut session = Session::new();
        assert_eq!(session.phase(), SessionPhase::WaitingForParticipants);

        let (tx, _rx) = mpsc::channel(4);
        session.register_participant(tx.clone(), None);
        assert_eq!(session.phase(), SessionPhase::WaitingForParticipants);
        session.register_participant(tx, None);
        assert_eq!(session.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn test_turn_alternates() {
        let (mut session, _rx1, _rx2) = two_player_session();
        assert_eq!(session.current_turn(), 1);

        assert_eq!(session.submit_move(1, pos(1, 1)), vec![moved(1, 1, 1)]);
        assert_eq!(session.current_turn(), 2);

        assert_eq!(session.submit_move(2, pos(0, 0)), vec![moved(2, 0, 0)]);
        assert_eq!(session.current_turn(), 1);
    }

    #[test]
    fn test_out_of_turn_dropped() {
        let (mut session, _rx1, _rx2) = two_player_session();

        // 回合为 1 时 2 号走棋
        assert!(session.submit_move(2, pos(0, 0)).is_empty());
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.current_turn(), 1);
    }

    #[test]
    fn test_occupied_cell_dropped() {
        let (mut session, _rx1, _rx2) = two_player_session();
        session.submit_move(1, pos(0, 0));
        let before = *session.board();

        assert!(session.submit_move(2, pos(0, 0)).is_empty());
        assert_eq!(session.board(), &before);
        assert_eq!(session.current_turn(), 2);
    }

    #[test]
    fn test_third_participant_never_moves() {
        let (mut session, _rx1, _rx2) = two_player_session();
        let (tx3, _rx3) = mpsc::channel(4);
        assert_eq!(session.register_participant(tx3, None), 3);

        assert!(session.submit_move(3, pos(0, 0)).is_empty());
        session.submit_move(1, pos(0, 0));
        assert!(session.submit_move(3, pos(0, 1)).is_empty());
        assert_eq!(session.current_turn(), 2);
    }

    #[test]
    fn test_win_resets_board() {
        let (mut session, _rx1, _rx2) = two_player_session();
        session.submit_move(1, pos(0, 0));
        session.submit_move(2, pos(1, 0));
        session.submit_move(1, pos(0, 1));
        session.submit_move(2, pos(1, 1));

        let pending = session.submit_move(1, pos(0, 2));
        assert_eq!(
            pending,
            vec![moved(1, 0, 2), ServerMessage::Win { player: 1 }]
        );
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.current_turn(), 1);
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.snapshot().last_outcome, Some(Outcome::Win(1)));
    }

    #[test]
    fn test_second_player_win_resets_turn() {
        let (mut session, _rx1, _rx2) = two_player_session();
        session.submit_move(1, pos(0, 0));
        session.submit_move(2, pos(1, 0));
        session.submit_move(1, pos(0, 1));
        session.submit_move(2, pos(1, 1));
        session.submit_move(1, pos(2, 2));

        let pending = session.submit_move(2, pos(1, 2));
        assert_eq!(pending.last(), Some(&ServerMessage::Win { player: 2 }));
        assert_eq!(session.current_turn(), 1);
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_draw_keeps_board() {
        let (mut session, _rx1, _rx2) = two_player_session();
        // O X O / O X X / X O O
        let moves = [
            (1, 0, 0),
            (2, 0, 1),
            (1, 0, 2),
            (2, 1, 1),
            (1, 1, 0),
            (2, 1, 2),
            (1, 2, 1),
            (2, 2, 0),
        ];
        for (player, row, col) in moves {
            assert_eq!(session.submit_move(player, pos(row, col)).len(), 1);
        }

        let pending = session.submit_move(1, pos(2, 2));
        assert_eq!(pending, vec![moved(1, 2, 2), ServerMessage::Draw]);
        assert!(session.board().is_full());
        assert_eq!(session.phase(), SessionPhase::Terminal(Outcome::Draw));
        // 和棋不切换回合
        assert_eq!(session.current_turn(), 1);

        // 满盘后任何走棋都被丢弃
        assert!(session.submit_move(1, pos(0, 0)).is_empty());

        assert_eq!(session.reset(), vec![ServerMessage::Reset]);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn test_reset_mid_game() {
        let (mut session, _rx1, _rx2) = two_player_session();
        session.submit_move(1, pos(0, 0));
        session.submit_move(2, pos(2, 2));
        session.submit_move(1, pos(1, 1));
        assert_eq!(session.current_turn(), 2);

        assert_eq!(session.reset(), vec![ServerMessage::Reset]);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.current_turn(), 1);
    }

    #[test]
    fn test_broadcast_reaches_everyone_in_order() {
        let (mut session, mut rx1, mut rx2) = two_player_session();
        let pending = session.submit_move(1, pos(0, 0));
        session.broadcast(&pending);
        let pending = session.reset();
        session.broadcast(&pending);

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.try_recv(), Ok(moved(1, 0, 0)));
            assert_eq!(rx.try_recv(), Ok(ServerMessage::Reset));
        }
    }

    #[test]
    fn test_broadcast_removes_dead_participant() {
        let (mut session, _rx1, rx2) = two_player_session();
        drop(rx2);

        session.broadcast(&[ServerMessage::Reset]);
        assert_eq!(session.snapshot().participants, vec![1]);

        // 2 号已断开，但回合指针仍按 1/2 轮转
        session.submit_move(1, pos(0, 0));
        assert_eq!(session.current_turn(), 2);
    }

    #[test]
    fn test_send_to_missing_participant() {
        let mut session = Session::new();
        assert!(!session.send_to(1, ServerMessage::Draw));
    }

    #[test]
    fn test_unread_participant_is_removed() {
        let (mut session, mut rx1, mut rx2) = two_player_session();
        // 旁观者的队列只能放下一条消息，且从不读取
        let (tx3, _rx3) = mpsc::channel(1);
        let spectator = session.register_participant(tx3, None);
        assert!(session.send_to(spectator, ServerMessage::Welcome { player_id: spectator }));

        let pending = session.submit_move(1, pos(0, 0));
        session.broadcast(&pending);
        assert_eq!(session.snapshot().participants, vec![1, 2]);

        // 其余参与者照常收到广播，对局继续
        assert_eq!(rx1.try_recv(), Ok(moved(1, 0, 0)));
        assert_eq!(rx2.try_recv(), Ok(moved(1, 0, 0)));
        let pending = session.submit_move(2, pos(1, 1));
        session.broadcast(&pending);
        assert_eq!(rx1.try_recv(), Ok(moved(2, 1, 1)));
    }
}
