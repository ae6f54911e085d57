use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tictactoe_server::{Server, ServerConfig};

/// 井字棋服务端
#[derive(Parser, Debug)]
#[command(name = "tictactoe-server", version)]
struct Args {
    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 监听地址（覆盖配置文件）
    #[arg(long)]
    host: Option<String>,

    /// 监听端口（覆盖配置文件）
    #[arg(short, long)]
    port: Option<u16>,

    /// 最多接受的参与者数量
    #[arg(long)]
    max_participants: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("tictactoe_server=debug".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = args.host {
        config.network.host = host;
    }
    if let Some(port) = args.port {
        config.network.port = port;
    }
    if args.max_participants.is_some() {
        config.max_participants = args.max_participants;
    }

    info!("井字棋服务端启动中...");

    let server = Server::bind(config).await?;
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
