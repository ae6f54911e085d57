use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::{NetworkConfig, DEFAULT_HOST, DEFAULT_PORT};
use tictactoe_client::{parse_input, BotPlayer, NetworkConnection, PlayerInput};

/// 井字棋客户端
#[derive(Parser, Debug)]
#[command(name = "tictactoe-client", version)]
struct Args {
    /// 服务端地址
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// 服务端端口
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// 由 AI 自动对局
    #[arg(long)]
    bot: bool,

    /// AI 难度：0 随机，1 及以上完美
    #[arg(short, long, default_value_t = 1)]
    level: u8,

    /// 自动对局完成指定局数后退出
    #[arg(long)]
    rounds: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("tictactoe_client=debug".parse()?))
        .init();

    let args = Args::parse();
    let addr = NetworkConfig {
        host: args.host,
        port: args.port,
    }
    .addr();

    let conn = NetworkConnection::connect(&addr).await?;
    info!("You are player {}", conn.player_id());

    // 每次更新都输出棋盘
    let mut updates = conn.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            info!("\n{}", snapshot);
        }
    });

    if args.bot {
        let bot = BotPlayer::new(conn.player_id(), args.level);
        tokio::select! {
            result = bot.run(&conn, args.rounds) => result?,
            _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        }
        return Ok(());
    }

    info!("Enter moves as `row,col`, `reset` to clear the board, `quit` to leave");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = conn.subscribe();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Some(PlayerInput::Move(pos))) => conn.send_move(pos).await?,
                    Ok(Some(PlayerInput::Reset)) => conn.send_reset().await?,
                    Ok(Some(PlayerInput::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => warn!("Invalid input: {}", e),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() || !updates.borrow_and_update().connected {
                    info!("Disconnected from server");
                    break;
                }
            }
        }
    }

    Ok(())
}
