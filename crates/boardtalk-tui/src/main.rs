use std::io::{stdout, Stdout};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use boardtalk_core::Identity;
use boardtalk_service::{DiscussionService, EventBus, HttpService, LocalService};
use boardtalk_tui::app::{App, Mode};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "boardtalk",
    version,
    about = "Terminal client for per-task board discussions"
)]
struct Cli {
    /// Base URL of a remote board server. Without it the board runs in
    /// process, seeded with demo data.
    #[arg(long, env = "BOARDTALK_SERVER")]
    server: Option<String>,

    /// Handle to post under.
    #[arg(long, env = "BOARDTALK_HANDLE", default_value = "me")]
    handle: String,

    /// Expose the in-process board over HTTP on this address, so other
    /// clients can join the same discussions. Ignored with --server.
    #[arg(long, env = "BOARDTALK_ADDR")]
    serve: Option<SocketAddr>,

    /// Append logs to this file. The terminal itself belongs to the UI, so
    /// without this, logging is off.
    #[arg(long, env = "BOARDTALK_LOG")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let (service, bus, author) = connect(&cli).await?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, service, author, bus).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

async fn connect(cli: &Cli) -> Result<(Arc<dyn DiscussionService>, Option<EventBus>, Identity)> {
    if let Some(url) = &cli.server {
        let http = HttpService::new(url);
        http.health_check()
            .await
            .with_context(|| format!("no board server reachable at {url}"))?;
        // The remote board resolves the author embedding; we only carry the
        // handle. No bus either: push sync does not cross HTTP.
        let author = Identity {
            id: cli.handle.clone(),
            handle: cli.handle.clone(),
            display_name: cli.handle.clone(),
            full_name: None,
            avatar_url: None,
        };
        return Ok((Arc::new(http), None, author));
    }

    let local = LocalService::new();
    local.seed_demo()?;
    let author = local.ensure_member(&cli.handle)?;

    if let Some(addr) = cli.serve {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        tracing::info!(%addr, "board exposed over http");
        let service = local.clone();
        tokio::spawn(async move {
            if let Err(e) = boardtalk_server::serve(listener, service).await {
                tracing::error!(error = %e, "embedded server exited");
            }
        });
    }

    let bus = local.bus();
    Ok((Arc::new(local), Some(bus), author))
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    service: Arc<dyn DiscussionService>,
    author: Identity,
    bus: Option<EventBus>,
) -> Result<()> {
    let mut app = App::new(service, author, bus).await?;
    loop {
        app.tick().await;
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if matches!(app.mode(), Mode::TaskList) && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                app.handle_key(key).await;
            }
        }
    }
}
