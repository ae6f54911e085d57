//! 搜索引擎
//!
//! 难度 0 随机落子，难度 1 及以上做完整的 Minimax 搜索。
//! 3x3 棋盘的博弈树足够小，不需要剪枝；更大的棋盘应在
//! [`AiEngine::minimax`] 处加入 Alpha-Beta 或深度限制。

use protocol::{Board, PlayerId, Position, FIRST_PLAYER, SECOND_PLAYER};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::evaluate::Evaluator;

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// 在空格中均匀随机选择
    Random,
    /// 完整 Minimax 搜索，不会输
    Perfect,
}

impl Difficulty {
    /// 从数字难度转换：0 为随机，其余为完整搜索
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Difficulty::Random,
            _ => Difficulty::Perfect,
        }
    }
}

/// AI 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// AI 扮演的玩家；1 号从最大化层开始搜索，其余从最小化层开始
    pub player: PlayerId,
}

impl AiConfig {
    pub fn from_level(level: u8) -> Self {
        Self {
            difficulty: Difficulty::from_level(level),
            player: SECOND_PLAYER,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_level(1)
    }
}

/// AI 引擎
///
/// 随机数源可注入，测试时传入固定种子即可复现随机落子。
pub struct AiEngine<R = ChaCha8Rng> {
    config: AiConfig,
    rng: R,
    nodes_searched: u64,
}

impl AiEngine<ChaCha8Rng> {
    /// 创建新的 AI 引擎（随机数源使用系统熵）
    pub fn new(config: AiConfig) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// 从数字难度创建（扮演 2 号玩家）
    pub fn from_level(level: u8) -> Self {
        Self::new(AiConfig::from_level(level))
    }
}

impl<R: Rng> AiEngine<R> {
    /// 使用指定随机数源创建
    pub fn with_rng(config: AiConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            nodes_searched: 0,
        }
    }

    /// 计算下一步落子位置
    ///
    /// 棋盘已满时返回 `None`。棋盘按值传入搜索，实盘不会被修改。
    pub fn decide(&mut self, board: &Board) -> Option<Position> {
        self.nodes_searched = 0;

        let pos = match self.config.difficulty {
            Difficulty::Random => self.random_move(board),
            Difficulty::Perfect => {
                let maximizing = self.config.player == FIRST_PLAYER;
                let (score, pos) = self.minimax(board, maximizing);
                tracing::debug!(
                    player = self.config.player,
                    score,
                    nodes = self.nodes_searched,
                    "minimax finished"
                );
                pos
            }
        };

        if let Some(pos) = pos {
            tracing::debug!(player = self.config.player, %pos, "AI move");
        }
        pos
    }

    /// 在空格中均匀随机选择
    fn random_move(&mut self, board: &Board) -> Option<Position> {
        board.empty_cells().choose(&mut self.rng).copied()
    }

    /// Minimax 搜索
    ///
    /// 返回 (分数, 最佳位置)。最大化层模拟 1 号落子，取严格更大的分数；
    /// 最小化层模拟 2 号落子，取严格更小的分数。同分时保留行优先扫描中
    /// 最先遇到的位置。终局返回的位置为 `None`。
    pub fn minimax(&mut self, board: &Board, maximizing: bool) -> (i32, Option<Position>) {
        self.nodes_searched += 1;

        if let Some(score) = Evaluator::terminal_score(board) {
            return (score, None);
        }

        let (player, mut best_score) = if maximizing {
            (FIRST_PLAYER, i32::MIN)
        } else {
            (SECOND_PLAYER, i32::MAX)
        };
        let mut best_move = None;

        for pos in board.empty_cells() {
            // 在副本上模拟落子
            let mut next = *board;
            next.mark(pos, player);

            let (score, _) = self.minimax(&next, !maximizing);

            let better = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if better {
                best_score = score;
                best_move = Some(pos);
            }
        }

        (best_score, best_move)
    }

    /// 获取上一次决策搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// 获取配置
    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}

/// 以 2 号玩家身份计算一步（随机数源使用系统熵）
pub fn decide(board: &Board, level: u8) -> Option<Position> {
    AiEngine::from_level(level).decide(board)
}
