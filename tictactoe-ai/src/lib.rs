//! 井字棋 AI 引擎
//!
//! 包含:
//! - 终局评估函数
//! - 随机落子
//! - 完整 Minimax 搜索

mod evaluate;
mod search;

pub use evaluate::{Evaluator, DRAW, MAX_WIN, MIN_WIN};
pub use search::{decide, AiConfig, AiEngine, Difficulty};
