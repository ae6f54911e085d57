//! 井字棋客户端
//!
//! 无界面客户端：连接服务端、维护本地棋盘镜像，并通过 watch 通道
//! 把每次更新推送给渲染/输入层。可选由 AI 自动对局。

pub mod game;
pub mod network;

pub use game::{parse_input, BotPlayer, ClientGame, GameOutcome, GameSnapshot, PlayerInput};
pub use network::NetworkConnection;
