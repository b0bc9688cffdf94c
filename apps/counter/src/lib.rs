//! # Shelf Counter
//!
//! Command-line application for counting shelf inventory by barcode.
//!
//! ## Module Organization
//! ```text
//! shelf_counter/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── counter.toml + SHELF_* overrides
//! ├── state.rs        ◄─── Database, ledger and preferences
//! ├── commands/       ◄─── One module per command group
//! └── error.rs        ◄─── AppError returned by commands
//! ```
//!
//! ## Output
//! Command reports go to stdout; logs go to stderr so reports stay
//! pipeable. `RUST_LOG` overrides the default log filter.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CounterConfig;
use error::AppResult;
use state::AppState;

/// Parses the command line and runs one command.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ───► stderr, RUST_LOG or the default filter     │
/// │  2. Load Configuration ───► --config must load; the default may not    │
/// │  3. Open Database ────────► create dir, WAL, run migrations            │
/// │  4. Restore State ────────► ledger + preferences                       │
/// │  5. Dispatch ─────────────► command report on stdout                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(code = e.code.as_str(), "Command failed");
            eprintln!("{}", e);
            ExitCode::from(e.code.exit_status())
        }
    }
}

async fn execute(cli: Cli) -> AppResult<()> {
    let config = match cli.config.as_deref() {
        Some(path) => CounterConfig::load(Some(path))?,
        None => CounterConfig::load_or_default(None),
    };

    let mut state = AppState::open(config).await?;
    info!(entries = state.ledger.len(), "State restored");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = commands::dispatch(cli.command, &mut state, &mut out).await;
    out.flush()?;

    state.close().await;
    result
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shelf=trace` - Show trace for shelf crates only
/// - Default: info, debug for shelf crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shelf=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
