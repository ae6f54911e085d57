//! 服务端配置

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use protocol::{NetworkConfig, OUTBOUND_BUFFER};

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取文件失败
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// 服务端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    /// 最多接受的参与者数量；`None` 表示不限（3 号及以后只能旁观）
    pub max_participants: Option<usize>,
    /// 每个连接发送队列的容量
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            max_participants: None,
            outbound_buffer: OUTBOUND_BUFFER,
        }
    }
}

impl ServerConfig {
    /// 从 JSON 文件加载，缺省字段使用默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
