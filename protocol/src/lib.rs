//! 井字棋共享协议库
//!
//! 包含:
//! - 格子、位置、棋盘等核心数据结构
//! - 胜负与满盘判定
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码 (FrameReader, FrameWriter)

mod board;
mod cell;
mod constants;
mod error;
mod message;
mod transport;

pub use board::{Board, LINES};
pub use cell::{opponent, Cell, PlayerId, Position};
pub use constants::*;
pub use error::{ProtocolError, Result};
pub use message::{ClientMessage, ServerMessage, WireMessage};
pub use transport::{
    Connection, Connector, Listener,
    TcpConnection, TcpConnector, TcpListener,
    NetworkConfig,
    FrameReader, FrameWriter,
};
