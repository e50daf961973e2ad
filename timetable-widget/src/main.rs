mod app;
mod backend;
mod bootstrap;
mod cli;
mod config;
mod runtime;
mod session;
mod ui;

use anyhow::Result;
use app::App;
use bootstrap::LogTarget;
use clap::Parser;
use cli::{Cli, Commands};
use config::ConfigStore;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::{PollMode, SessionController};
use std::io;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_widget(cli.config, PollMode::Interactive).await,
        Commands::Companion => run_widget(cli.config, PollMode::Companion).await,
        Commands::Config { action } => {
            bootstrap::init_logging(LogTarget::Stderr);
            bootstrap::run_config_command(action, bootstrap::open_store(cli.config)?)
        }
        Commands::RemoteSettings { reset_position } => {
            bootstrap::init_logging(LogTarget::Stderr);
            let store = bootstrap::open_store(cli.config)?;
            bootstrap::print_remote_settings(&store, reset_position).await
        }
    }
}

async fn run_widget(config_path: Option<std::path::PathBuf>, mode: PollMode) -> Result<()> {
    bootstrap::init_logging(LogTarget::File);
    let store = bootstrap::open_store(config_path)?;
    tracing::info!(
        "starting in {:?} mode against {}",
        mode,
        store.backend_url()
    );
    run_tui(store, mode).await
}

async fn run_tui(store: ConfigStore, mode: PollMode) -> Result<()> {
    let client = bootstrap::build_client(&store)?;
    let mut session = SessionController::new(client, store, mode, Instant::now());
    let mut app = App::new(mode);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, &mut session).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!("widget stopped: {:#}", err);
    }
    res
}
