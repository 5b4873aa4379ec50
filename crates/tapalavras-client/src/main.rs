mod app;
mod event;
mod input;
mod ui;

use std::io;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

/// Tapalavras client - multiplayer word game in the terminal
#[derive(Parser, Debug)]
#[command(name = "tapalavras", version, about)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, env = "TAPALAVRAS_SERVER", default_value = "127.0.0.1:4000")]
    server: String,

    /// Player name
    #[arg(short, long)]
    name: Option<String>,

    /// Room code to join right away (requires --name)
    #[arg(short, long)]
    room: Option<String>,

    /// Create a new room instead of joining one (requires --name)
    #[arg(long)]
    host: bool,

    /// Show the debug note overlay
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapalavras_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = app::Config {
        server: args.server,
        name: args.name,
        room: args.room,
        host: args.host,
        debug: args.debug,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app::run(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}
