//! 协议常量定义

use std::time::Duration;

use crate::cell::PlayerId;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 3;

/// 棋盘格子总数
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 先手玩家 ID（也是每局开始时的回合指针）
pub const FIRST_PLAYER: PlayerId = 1;

/// 后手玩家 ID（自动对手默认扮演的身份）
pub const SECOND_PLAYER: PlayerId = 2;

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 1024;

/// 默认监听地址
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// 默认端口
pub const DEFAULT_PORT: u16 = 5555;

/// 每个连接的发送队列容量
pub const OUTBOUND_BUFFER: usize = 64;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);
