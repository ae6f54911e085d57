//! 消息类型定义
//!
//! 所有消息都是纯文本，每个逻辑事件一条：
//!
//! | 方向 | 文本 | 含义 |
//! |---|---|---|
//! | 服务端 → 客户端 | `2` | 分配的玩家 ID（连接时发送一次） |
//! | 客户端 → 服务端 | `1,2` | 走棋意图 |
//! | 客户端 → 服务端 | `reset` | 请求重置棋盘 |
//! | 服务端 → 所有人 | `1,1,2` | 已提交的走棋 |
//! | 服务端 → 所有人 | `win,1` | 玩家获胜，棋盘重置 |
//! | 服务端 → 所有人 | `draw` | 棋盘已满无人获胜（不重置） |
//! | 服务端 → 所有人 | `reset` | 棋盘已重置 |

use std::fmt;
use std::str::FromStr;


use crate::cell::{PlayerId, Position};
use crate::error::{ProtocolError, Result};

const RESET: &str = "reset";
const DRAW: &str = "draw";
const WIN: &str = "win";

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// 走棋
    MakeMove { pos: Position },
    /// 请求重置棋盘
    Reset,
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    /// 分配玩家 ID
    Welcome { player_id: PlayerId },
    /// 走棋完成
    MoveMade { player: PlayerId, pos: Position },
    /// 玩家获胜（棋盘随之重置）
    Win { player: PlayerId },
    /// 和棋
    Draw,
    /// 棋盘已重置
    Reset,
}

/// 线上文本消息
pub trait WireMessage: Sized {
    /// 编码为线上文本
    fn encode(&self) -> String;

    /// 从线上文本解析
    fn parse(text: &str) -> Result<Self>;
}

impl WireMessage for ClientMessage {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

impl WireMessage for ServerMessage {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::MakeMove { pos } => write!(f, "{},{}", pos.row(), pos.col()),
            ClientMessage::Reset => f.write_str(RESET),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome { player_id } => write!(f, "{}", player_id),
            ServerMessage::MoveMade { player, pos } => {
                write!(f, "{},{},{}", player, pos.row(), pos.col())
            }
            ServerMessage::Win { player } => write!(f, "{},{}", WIN, player),
            ServerMessage::Draw => f.write_str(DRAW),
            ServerMessage::Reset => f.write_str(RESET),
        }
    }
}

impl FromStr for ClientMessage {
    type Err = ProtocolError;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == RESET {
            return Ok(ClientMessage::Reset);
        }

        match fields(text).as_slice() {
            [row, col] => Ok(ClientMessage::MakeMove {
                pos: parse_position(text, row, col)?,
            }),
            _ => Err(ProtocolError::malformed(text)),
        }
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        match text {
            RESET => return Ok(ServerMessage::Reset),
            DRAW => return Ok(ServerMessage::Draw),
            _ => {}
        }

        match fields(text).as_slice() {
            [player_id] => Ok(ServerMessage::Welcome {
                player_id: parse_player(text, player_id)?,
            }),
            [WIN, player] => Ok(ServerMessage::Win {
                player: parse_player(text, player)?,
            }),
            [player, row, col] => Ok(ServerMessage::MoveMade {
                player: parse_player(text, player)?,
                pos: parse_position(text, row, col)?,
            }),
            _ => Err(ProtocolError::malformed(text)),
        }
    }
}

/// 按逗号切分并去掉每段两侧空白（兼容 `"1, 2"` 这种写法）
fn fields(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}

fn parse_player(text: &str, field: &str) -> Result<PlayerId> {
    field.parse().map_err(|_| ProtocolError::malformed(text))
}

fn parse_position(text: &str, row: &str, col: &str) -> Result<Position> {
    let row: i64 = row.parse().map_err(|_| ProtocolError::malformed(text))?;
    let col: i64 = col.parse().map_err(|_| ProtocolError::malformed(text))?;
    match (u8::try_from(row), u8::try_from(col)) {
        (Ok(r), Ok(c)) => Position::new(r, c),
        _ => Err(ProtocolError::InvalidPosition { row, col }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_encode() {
        let msg = ClientMessage::MakeMove {
            pos: Position::new_unchecked(1, 2),
        };
        assert_eq!(msg.encode(), "1,2");
        assert_eq!(ClientMessage::Reset.encode(), "reset");
    }

    #[test]
    fn test_client_message_parse() {
        assert_eq!(
            ClientMessage::parse("2,0").unwrap(),
            ClientMessage::MakeMove {
                pos: Position::new_unchecked(2, 0)
            }
        );
        // 旧客户端会在逗号后加空格
        assert_eq!(
            ClientMessage::parse("1, 1").unwrap(),
            ClientMessage::MakeMove {
                pos: Position::new_unchecked(1, 1)
            }
        );
        assert_eq!(ClientMessage::parse("reset\n").unwrap(), ClientMessage::Reset);
    }

    #[test]
    fn test_client_message_malformed() {
        for text in ["", "hello", "1", "1,2,3", "a,b", "1,", "RESET"] {
            assert!(
                matches!(ClientMessage::parse(text), Err(ProtocolError::Malformed { .. })),
                "{:?} should be malformed",
                text
            );
        }
    }

    #[test]
    fn test_client_message_out_of_range() {
        assert!(matches!(
            ClientMessage::parse("3,0"),
            Err(ProtocolError::InvalidPosition { row: 3, col: 0 })
        ));
        assert!(matches!(
            ClientMessage::parse("-1,2"),
            Err(ProtocolError::InvalidPosition { row: -1, col: 2 })
        ));
        assert!(matches!(
            ClientMessage::parse("0,300"),
            Err(ProtocolError::InvalidPosition { row: 0, col: 300 })
        ));
    }

    #[test]
    fn test_server_message_encode() {
        assert_eq!(ServerMessage::Welcome { player_id: 3 }.encode(), "3");
        assert_eq!(
            ServerMessage::MoveMade {
                player: 2,
                pos: Position::new_unchecked(0, 1)
            }
            .encode(),
            "2,0,1"
        );
        assert_eq!(ServerMessage::Win { player: 1 }.encode(), "win,1");
        assert_eq!(ServerMessage::Draw.encode(), "draw");
        assert_eq!(ServerMessage::Reset.encode(), "reset");
    }

    #[test]
    fn test_server_message_parse() {
        assert_eq!(
            ServerMessage::parse("1").unwrap(),
            ServerMessage::Welcome { player_id: 1 }
        );
        assert_eq!(
            ServerMessage::parse("1, 2, 0").unwrap(),
            ServerMessage::MoveMade {
                player: 1,
                pos: Position::new_unchecked(2, 0)
            }
        );
        assert_eq!(
            ServerMessage::parse("win, 2").unwrap(),
            ServerMessage::Win { player: 2 }
        );
        assert_eq!(ServerMessage::parse("draw").unwrap(), ServerMessage::Draw);
        assert_eq!(ServerMessage::parse("reset").unwrap(), ServerMessage::Reset);
    }

    #[test]
    fn test_server_message_malformed() {
        for text in ["", "lose,1", "win,x", "1,2", "x,1,1", "1,2,3,4"] {
            assert!(ServerMessage::parse(text).is_err(), "{:?} should fail", text);
        }
    }
}
