//! 井字棋服务端
//!
//! 包含:
//! - 配置加载
//! - 玩家管理
//! - 对局状态机
//! - 连接协调与接受循环

pub mod config;
pub mod player;
pub mod server;
pub mod session;

pub use config::{ConfigError, ServerConfig};
pub use player::{Participant, PlayerManager};
pub use server::{handle_connection, Command, MessageHandler, Server, ServerState, SessionHandle};
pub use session::{Outcome, Session, SessionPhase, SessionSnapshot};
