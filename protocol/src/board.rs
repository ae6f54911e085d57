//! 棋盘状态

use crate::cell::{Cell, PlayerId, Position};
use crate::constants::{BOARD_SIZE, CELL_COUNT};

/// 全部 8 条连线：3 行、3 列、2 条对角线
pub const LINES: [[Position; 3]; 8] = [
    // 行
    [Position::new_unchecked(0, 0), Position::new_unchecked(0, 1), Position::new_unchecked(0, 2)],
    [Position::new_unchecked(1, 0), Position::new_unchecked(1, 1), Position::new_unchecked(1, 2)],
    [Position::new_unchecked(2, 0), Position::new_unchecked(2, 1), Position::new_unchecked(2, 2)],
    // 列
    [Position::new_unchecked(0, 0), Position::new_unchecked(1, 0), Position::new_unchecked(2, 0)],
    [Position::new_unchecked(0, 1), Position::new_unchecked(1, 1), Position::new_unchecked(2, 1)],
    [Position::new_unchecked(0, 2), Position::new_unchecked(1, 2), Position::new_unchecked(2, 2)],
    // 对角线
    [Position::new_unchecked(0, 0), Position::new_unchecked(1, 1), Position::new_unchecked(2, 2)],
    [Position::new_unchecked(2, 0), Position::new_unchecked(1, 1), Position::new_unchecked(0, 2)],
];

/// 棋盘
///
/// 3x3 网格，索引为 row * 3 + col。格子只会从 `Empty` 变为 `Player(n)`，
/// 除非整盘重置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// 创建空棋盘
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// 获取指定位置的格子
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// 落子（不检查规则，调用方须先确认 `is_available`）
    pub fn mark(&mut self, pos: Position, player: PlayerId) {
        self.cells[pos.to_index()] = Cell::Player(player);
    }

    /// 格子是否为空
    pub fn is_available(&self, pos: Position) -> bool {
        self.get(pos).is_empty()
    }

    /// 棋盘是否已满
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// 玩家是否占满任意一条连线
    pub fn check_win(&self, player: PlayerId) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&pos| self.get(pos) == Cell::Player(player)))
    }

    /// 获取占满某条连线的玩家（按行、列、对角线顺序检查）
    pub fn winner(&self) -> Option<PlayerId> {
        LINES.iter().find_map(|[a, b, c]| {
            let owner = self.get(*a).owner()?;
            (self.get(*b) == Cell::Player(owner) && self.get(*c) == Cell::Player(owner))
                .then_some(owner)
        })
    }

    /// 所有空格（行优先顺序）
    pub fn empty_cells(&self) -> Vec<Position> {
        Position::all().filter(|&pos| self.is_available(pos)).collect()
    }

    /// 已落子数量
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// 所有格子（行优先顺序）
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.cells.chunks(BOARD_SIZE).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.display_char())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert!(!board.is_full());
        assert_eq!(board.empty_cells().len(), 9);
        assert!(!board.check_win(1));
        assert!(!board.check_win(2));
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_every_line_wins() {
        for player in [1, 2] {
            let other = if player == 1 { 2 } else { 1 };
            for line in LINES {
                let mut board = Board::new();
                for p in line {
                    board.mark(p, player);
                }
                assert!(board.check_win(player), "line {:?} for {}", line, player);
                assert!(!board.check_win(other));
                assert_eq!(board.winner(), Some(player));
            }
        }
    }

    #[test]
    fn test_two_in_a_row_is_not_win() {
        let mut board = Board::new();
        board.mark(pos(0, 0), 1);
        board.mark(pos(0, 1), 1);
        board.mark(pos(0, 2), 2);
        assert!(!board.check_win(1));
        assert!(!board.check_win(2));
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new();
        for (i, p) in Position::all().enumerate() {
            assert!(!board.is_full());
            board.mark(p, if i % 2 == 0 { 1 } else { 2 });
        }
        assert!(board.is_full());
        assert!(board.empty_cells().is_empty());
    }

    #[test]
    fn test_mark_and_available() {
        let mut board = Board::new();
        assert!(board.is_available(pos(1, 1)));
        board.mark(pos(1, 1), 2);
        assert!(!board.is_available(pos(1, 1)));
        assert_eq!(board.get(pos(1, 1)), Cell::Player(2));
        assert_eq!(board.occupied_count(), 1);
        assert!(!board.empty_cells().contains(&pos(1, 1)));
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        board.mark(pos(0, 0), 1);
        board.mark(pos(2, 2), 2);
        assert_eq!(board.to_string(), "O..\n...\n..X");
    }
}
