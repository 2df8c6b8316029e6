//! # Krabby Console Library
//!
//! Wires the sync layer into a headless operator console.
//!
//! ## Module Organization
//! ```text
//! krabby_console_lib/
//! ├── lib.rs          ◄─── You are here (startup & input loop)
//! ├── state.rs        ◄─── Handles and drafts owned by the loop
//! ├── commands.rs     ◄─── Line parsing and command execution
//! ├── view.rs         ◄─── Text rendering and watcher tasks
//! └── error.rs        ◄─── Console error type and codes
//! ```

pub mod commands;
pub mod error;
pub mod state;
pub mod view;

use std::sync::Arc;

use krabby_sync::{
    ConsoleConfig, HttpGateway, MutationPipeline, NotificationCenter, SharedGateway, SyncEngine,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use commands::Flow;
use error::ConsoleError;
use state::ConsoleState;

/// Runs the console until `quit` or Ctrl-C.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Console Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → console.toml → KRABBY_* environment                    │
/// │                                                                         │
/// │  3. Build Components ─────────────────────────────────────────────────► │
/// │     • HttpGateway → SyncEngine → MutationPipeline                       │
/// │     • NotificationCenter shared by engine and pipeline                  │
/// │                                                                         │
/// │  4. Start Polling ────────────────────────────────────────────────────► │
/// │     • immediate refresh, then every poll_interval                       │
/// │                                                                         │
/// │  5. Read Commands ────────────────────────────────────────────────────► │
/// │     • stdin lines until quit; after EOF keep polling until Ctrl-C       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), ConsoleError> {
    init_tracing();

    info!("Starting Krabby Console");

    let config = ConsoleConfig::load_or_default(None);
    info!(
        api = config.base_url(),
        poll_secs = config.sync.poll_interval_secs,
        "Configuration loaded"
    );

    let gateway: SharedGateway = Arc::new(HttpGateway::from_config(&config)?);
    let notices = NotificationCenter::new(config.notification_window());
    let sync = SyncEngine::spawn(Arc::clone(&gateway), notices.clone());
    let pipeline = MutationPipeline::new(gateway, sync.clone(), notices.clone());

    tokio::spawn(view::watch_snapshots(sync.subscribe()));
    tokio::spawn(view::watch_notifications(notices.subscribe()));

    sync.start_polling(config.poll_interval()).await?;

    let mut state = ConsoleState::new(sync.clone(), pipeline, notices, config.poll_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("{}", commands::HELP);

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match commands::parse(&line) {
                    Ok(Some(command)) => match commands::execute(&mut state, command).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => println!("{}", e),
                    },
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                },
                Ok(None) => {
                    info!("stdin closed; polling continues until Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
        }
    }

    sync.stop_polling().await;
    if let Err(e) = sync.shutdown().await {
        error!(error = %e, "Sync engine did not shut down cleanly");
    }

    info!("Krabby Console stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=krabby_sync=trace` - Trace the sync layer only
/// - Default: INFO, DEBUG for krabby crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,krabby=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
