//! 格子、位置与玩家身份

use crate::constants::{BOARD_SIZE, CELL_COUNT, FIRST_PLAYER, SECOND_PLAYER};
use crate::error::{ProtocolError, Result};

/// 玩家 ID（按连接顺序从 1 开始分配）
pub type PlayerId = u64;

/// 获取对手身份
///
/// 回合指针只会在 1 和 2 之间切换；其他身份没有对手。
pub fn opponent(player: PlayerId) -> Option<PlayerId> {
    match player {
        FIRST_PLAYER => Some(SECOND_PLAYER),
        SECOND_PLAYER => Some(FIRST_PLAYER),
        _ => None,
    }
}

/// 格子状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// 空格
    #[default]
    Empty,
    /// 被某个玩家占据
    Player(PlayerId),
}

impl Cell {
    /// 是否为空格
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 占据该格的玩家
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Player(id) => Some(*id),
        }
    }

    /// 显示字符（1 号为 O，2 号为 X）
    pub fn display_char(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Player(FIRST_PLAYER) => 'O',
            Cell::Player(SECOND_PLAYER) => 'X',
            Cell::Player(_) => '?',
        }
    }
}

/// 棋盘位置
///
/// 只能通过 [`Position::new`] 或 [`Position::from_index`] 从外部构造，
/// 所以行列一定在 0..3 内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// 创建新位置，越界时返回错误
    pub fn new(row: u8, col: u8) -> Result<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Ok(Self { row, col })
        } else {
            Err(ProtocolError::InvalidPosition {
                row: row as i64,
                col: col as i64,
            })
        }
    }

    /// 不检查边界，仅供本库的常量表使用
    pub(crate) const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 行 (0-2)
    pub fn row(&self) -> u8 {
        self.row
    }

    /// 列 (0-2)
    pub fn col(&self) -> u8 {
        self.col
    }

    /// 转换为数组索引（行优先）
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < CELL_COUNT {
            Some(Self {
                row: (index / BOARD_SIZE) as u8,
                col: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 按行优先顺序遍历所有位置
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).filter_map(Position::from_index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
