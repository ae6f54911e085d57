//! 客户端游戏状态
//!
//! 本地棋盘镜像。服务端是权威方，客户端只按收到的广播更新，
//! 从不自行判断胜负。

use std::fmt;

use protocol::{opponent, Board, PlayerId, Position, ServerMessage, FIRST_PLAYER};

/// 一局的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win(PlayerId),
    Draw,
}

/// 供渲染/输入层读取的状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// 本客户端的 ID
    pub player_id: PlayerId,
    pub board: Board,
    /// 当前轮到谁
    pub current_turn: PlayerId,
    /// 最后一步 (玩家, 位置)
    pub last_move: Option<(PlayerId, Position)>,
    /// 最近一局的结果，新一局落子后清除
    pub last_outcome: Option<GameOutcome>,
    /// 与服务端的连接是否仍然有效
    pub connected: bool,
    /// 已应用的广播数量，每条消息加一
    pub version: u64,
    /// 已结束的局数，每条胜负或平局广播加一
    pub rounds_finished: u64,
}

impl GameSnapshot {
    /// 是否轮到本客户端，且棋盘还有空位
    pub fn is_my_turn(&self) -> bool {
        self.connected && self.current_turn == self.player_id && !self.board.is_full()
    }
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        match self.last_outcome {
            Some(GameOutcome::Win(player)) if player == self.player_id => write!(f, "you win"),
            Some(GameOutcome::Win(player)) => write!(f, "player {} wins", player),
            Some(GameOutcome::Draw) => write!(f, "draw"),
            None if self.is_my_turn() => write!(f, "your turn"),
            None => write!(f, "player {} to move", self.current_turn),
        }
    }
}

/// 客户端游戏状态
#[derive(Debug, Clone)]
pub struct ClientGame {
    player_id: PlayerId,
    board: Board,
    current_turn: PlayerId,
    last_move: Option<(PlayerId, Position)>,
    last_outcome: Option<GameOutcome>,
    connected: bool,
    version: u64,
    rounds_finished: u64,
}

impl ClientGame {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            board: Board::new(),
            current_turn: FIRST_PLAYER,
            last_move: None,
            last_outcome: None,
            connected: true,
            version: 0,
            rounds_finished: 0,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> PlayerId {
        self.current_turn
    }

    pub fn last_outcome(&self) -> Option<GameOutcome> {
        self.last_outcome
    }

    pub fn rounds_finished(&self) -> u64 {
        self.rounds_finished
    }

    /// 应用一条服务端广播
    pub fn apply(&mut self, msg: &ServerMessage) {
        self.version += 1;
        match *msg {
            ServerMessage::Welcome { player_id } => {
                self.player_id = player_id;
            }
            ServerMessage::MoveMade { player, pos } => {
                self.board.mark(pos, player);
                self.last_outcome = None;
                self.last_move = Some((player, pos));
                self.current_turn = opponent(player).unwrap_or(FIRST_PLAYER);
            }
            ServerMessage::Win { player } => {
                // 服务端在胜局后立即清空棋盘
                self.board = Board::new();
                self.current_turn = FIRST_PLAYER;
                self.last_move = None;
                self.last_outcome = Some(GameOutcome::Win(player));
                self.rounds_finished += 1;
            }
            ServerMessage::Draw => {
                // 平局不切换回合，也不清空棋盘
                if let Some((player, _)) = self.last_move {
                    self.current_turn = player;
                }
                self.last_outcome = Some(GameOutcome::Draw);
                self.rounds_finished += 1;
            }
            ServerMessage::Reset => {
                self.board = Board::new();
                self.current_turn = FIRST_PLAYER;
                self.last_move = None;
                self.last_outcome = None;
            }
        }
    }

    /// 标记连接已断开
    pub fn set_disconnected(&mut self) {
        self.connected = false;
    }

    pub fn is_my_turn(&self) -> bool {
        self.snapshot().is_my_turn()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            player_id: self.player_id,
            board: self.board,
            current_turn: self.current_turn,
            last_move: self.last_move,
            last_outcome: self.last_outcome,
            connected: self.connected,
            version: self.version,
            rounds_finished: self.rounds_finished,
        }
    }
}
