use std::net::SocketAddr;

use anyhow::Result;
use boardtalk_service::LocalService;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boardtalk-server", about = "Board discussion API server")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BOARDTALK_ADDR", default_value = "127.0.0.1:3720")]
    addr: SocketAddr,

    /// Seed a small demo board on startup
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let service = LocalService::new();
    if cli.seed {
        service.seed_demo()?;
        tracing::info!("seeded demo board");
    }

    let listener = TcpListener::bind(cli.addr).await?;
    tracing::info!("boardtalk-server listening on http://{}", cli.addr);
    boardtalk_server::serve(listener, service).await
}
