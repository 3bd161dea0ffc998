//! mansion-client - terminal client for the Haunted Mansion text adventure
//!
//! Shows the server's narrative in a scrollback window and turns its
//! "What to do" section into a menu driven by arrow keys or mouse clicks.

mod config;
mod core;
mod frontend;
mod network;
mod session;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "mansion-client")]
#[command(about = "Terminal client for the Haunted Mansion text adventure", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Display name (overrides config)
    #[arg(short, long)]
    name: Option<String>,

    /// Join an existing game by code instead of starting a new one
    #[arg(long, value_name = "CODE")]
    code: Option<String>,

    /// Custom data directory (default: ~/.mansion-client)
    /// Can also be set via MANSION_CLIENT_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh game code to share with other players
    NewCode,
}

fn main() -> Result<()> {
    // TUI apps can't log to stdout, so we write to a file (RUST_LOG controls the level)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("mansion-client.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();

    let cli = Cli::parse();

    if let Some(Commands::NewCode) = cli.command {
        println!("{}", session::generate_code());
        return Ok(());
    }

    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var("MANSION_CLIENT_DIR", data_dir);
        tracing::info!("Using custom data directory: {:?}", data_dir);
    }

    let mut config = match &cli.config {
        Some(path) => config::Config::load_from_path(path)?,
        None => config::Config::load()?,
    };
    if let Some(host) = &cli.host {
        config.connection.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }

    let name = cli
        .name
        .clone()
        .or_else(|| config.connection.name.clone())
        .context("Specify --name or set connection.name in config")?;
    let session = session::SessionInfo::new(&name, cli.code.as_deref())?;
    tracing::info!(
        "Starting as {} in session {}",
        session.player_name,
        session.session_code
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_run_tui(config, session))
}

/// Async TUI main loop with network support
async fn async_run_tui(config: config::Config, session: session::SessionInfo) -> Result<()> {
    use crate::core::input_router::route_input;
    use crate::core::AppCore;
    use crossterm::event::{MouseButton, MouseEventKind};
    use frontend::{Frontend, FrontendEvent, TuiFrontend};
    use network::{ClientEvent, GameConnection, ServerMessage};
    use std::time::Duration;
    use tokio::sync::mpsc;

    // Create channels for network communication
    let (server_tx, mut server_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (command_tx, command_rx) = mpsc::unbounded_channel::<ClientEvent>();

    let host = config.connection.host.clone();
    let port = config.connection.port;
    let poll_timeout = Duration::from_millis(config.ui.poll_timeout_ms);

    let mut app_core = AppCore::new(config, session, command_tx);
    let mut frontend = TuiFrontend::new(poll_timeout)?;
    let (width, height) = frontend.size();
    tracing::debug!("Terminal size {}x{}", width, height);

    let network_handle = tokio::spawn(async move {
        if let Err(e) = GameConnection::start(&host, port, server_tx, command_rx).await {
            tracing::error!(error = ?e, "Network connection error");
        }
    });

    while app_core.running {
        for event in frontend.poll_events()? {
            match event {
                FrontendEvent::Key { code, modifiers } => {
                    app_core.handle_action(route_input(code, modifiers));
                }
                FrontendEvent::Mouse { kind, x, y } => match kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(index) = frontend.menu_entry_at(x, y) {
                            app_core.handle_menu_click(index);
                        }
                    }
                    MouseEventKind::ScrollUp if frontend.is_over_log(x, y) => {
                        app_core.scroll_log(true);
                    }
                    MouseEventKind::ScrollDown if frontend.is_over_log(x, y) => {
                        app_core.scroll_log(false);
                    }
                    _ => {}
                },
                FrontendEvent::Resize { width, height } => {
                    tracing::debug!("Terminal resized to {}x{}", width, height);
                    app_core.needs_render = true;
                }
            }
        }

        // Payloads are applied strictly in arrival order
        while let Ok(msg) = server_rx.try_recv() {
            app_core.handle_server_message(msg);
        }

        if app_core.needs_render {
            frontend.render(&app_core)?;
            app_core.needs_render = false;
        }

        // Let the network tasks run between frames
        tokio::task::yield_now().await;
    }

    frontend.cleanup()?;
    // Dropping the core drops the command sender, which ends the writer loop
    drop(app_core);
    network_handle.abort();

    Ok(())
}
