//! 输入处理
//!
//! 终端一行一个指令：`row,col` 落子，`reset` 重置，`quit` 退出。

use protocol::{ClientMessage, Position, ProtocolError, WireMessage};

/// 玩家输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Move(Position),
    Reset,
    Quit,
}

/// 解析一行输入，空行返回 `Ok(None)`
pub fn parse_input(line: &str) -> Result<Option<PlayerInput>, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
        return Ok(Some(PlayerInput::Quit));
    }

    // 与线上格式一致
    let input = match ClientMessage::parse(line)? {
        ClientMessage::MakeMove { pos } => PlayerInput::Move(pos),
        ClientMessage::Reset => PlayerInput::Reset,
    };
    Ok(Some(input))
}
