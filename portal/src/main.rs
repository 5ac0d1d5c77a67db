//! `Portal`: terminal customer portal.
//!
//! Shows the customer's task list, the support thread and a contact card.
//! State persists to a data directory between runs. Configuration via CLI
//! flags, environment variables, or config file
//! (`~/.config/portal/config.toml`).
//!
//! ```bash
//! # Persist under the platform data directory
//! cargo run --bin portal
//!
//! # Throwaway session, answering as support
//! cargo run --bin portal -- --ephemeral --role support
//!
//! # Or via environment variables
//! PORTAL_DATA_DIR=/tmp/portal PORTAL_LOG=debug cargo run
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use portal::app::App;
use portal::config::{CliArgs, PortalConfig};
use portal::session::Session;
use portal::storage;
use portal::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match PortalConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            PortalConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(role = %config.role, "portal starting");

    let store = storage::open_store(config.data_dir.as_deref(), config.quota_bytes);
    let session = Session::open(store, &config.session_config());
    let mut app = App::new(session, &config);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &mut app, &config);

    // Pending saves are written even if the loop failed.
    app.shutdown();

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("portal exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("portal.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Must be called inside the tokio runtime: debounced writers and
/// attachment workers are spawned onto it.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &PortalConfig,
) -> io::Result<()> {
    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Step 2: Collect finished photo attachments.
        app.poll_attachments();

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key_event(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
