//! 游戏逻辑模块
//!
//! 管理本地棋盘镜像、终端输入和自动对手

mod bot;
mod input;
mod state;

pub use bot::*;
pub use input::*;
pub use state::*;
