//! # Krabby Console Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Krabby Console                                 │
//! │                                                                         │
//! │  stdin ──► commands ──► MutationPipeline ──► restaurant API             │
//! │                              │                     ▲                    │
//! │                              ▼                     │                    │
//! │  stdout ◄── notices    SyncEngine ──── polls ──────┘                    │
//! │  stderr ◄── tracing                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match krabby_console_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("krabby-console: {}", e);
            ExitCode::FAILURE
        }
    }
}
