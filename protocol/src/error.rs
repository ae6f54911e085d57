//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 帧内容不是合法 UTF-8
    #[error("Frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// 消息格式错误
    #[error("Malformed message: {message:?}")]
    Malformed { message: String },

    /// 坐标越界
    #[error("Invalid position: ({row}, {col})")]
    InvalidPosition { row: i64, col: i64 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

impl ProtocolError {
    /// 构造消息格式错误
    pub fn malformed(message: impl Into<String>) -> Self {
        ProtocolError::Malformed {
            message: message.into(),
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
