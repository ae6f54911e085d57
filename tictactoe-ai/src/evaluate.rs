//! 终局评估函数

use protocol::{Board, FIRST_PLAYER};

/// 先手（最大化方）连成一线
pub const MAX_WIN: i32 = 1;

/// 后手（最小化方）连成一线
pub const MIN_WIN: i32 = -1;

/// 满盘无人获胜
pub const DRAW: i32 = 0;

/// 评估器
pub struct Evaluator;

impl Evaluator {
    /// 评估终局（先手视角，正值对先手有利）
    ///
    /// 非终局返回 `None`。
    pub fn terminal_score(board: &Board) -> Option<i32> {
        match board.winner() {
            Some(FIRST_PLAYER) => Some(MAX_WIN),
            Some(_) => Some(MIN_WIN),
            None if board.is_full() => Some(DRAW),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Position;

    fn board_from(rows: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                let pos = Position::new(r as u8, c as u8).unwrap();
                match ch {
                    'O' => board.mark(pos, 1),
                    'X' => board.mark(pos, 2),
                    _ => {}
                }
            }
        }
        board
    }

    #[test]
    fn test_non_terminal() {
        assert_eq!(Evaluator::terminal_score(&Board::new()), None);
        let board = board_from(["OX.", "...", "..."]);
        assert_eq!(Evaluator::terminal_score(&board), None);
    }

    #[test]
    fn test_first_player_wins() {
        let board = board_from(["OOO", "XX.", "..."]);
        assert_eq!(Evaluator::terminal_score(&board), Some(MAX_WIN));
    }

    #[test]
    fn test_second_player_wins() {
        let board = board_from(["OO.", "XXX", "O.."]);
        assert_eq!(Evaluator::terminal_score(&board), Some(MIN_WIN));
    }

    #[test]
    fn test_full_board_draw() {
        let board = board_from(["OXO", "OXX", "XOO"]);
        assert_eq!(Evaluator::terminal_score(&board), Some(DRAW));
    }

    #[test]
    fn test_win_on_full_board_is_not_draw() {
        let board = board_from(["OXO", "XOX", "XOO"]);
        assert_eq!(Evaluator::terminal_score(&board), Some(MAX_WIN));
    }
}
