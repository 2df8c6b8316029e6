//! # krabby-sync: Client-Side Sync Layer for the Krabby Console
//!
//! Keeps a local copy of the restaurant's tables, reservations, waitlist and
//! dashboard numbers in step with the backend, and routes every operator
//! action through validation, one write, and a follow-up refresh.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Console Sync Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 MutationPipeline (operator actions)              │  │
//! │  │  submit_reservation • submit_waitlist_entry • toggle_table       │  │
//! │  └──────────────┬──────────────────────────────┬────────────────────┘  │
//! │                 │ write                        │ refresh               │
//! │                 ▼                              ▼                       │
//! │  ┌────────────────────────┐     ┌─────────────────────────────────┐   │
//! │  │    ResourceGateway     │◀────│  SyncEngine (single writer)     │   │
//! │  │                        │read │                                 │   │
//! │  │  HttpGateway (reqwest) │     │  poll ticker, sequenced         │   │
//! │  │  4 reads, 3 writes     │     │  refreshes, watch<Arc<Snapshot>>│   │
//! │  └────────────────────────┘     └───────────────┬─────────────────┘   │
//! │                                                 │                      │
//! │  ┌──────────────────────────────────────────────▼─────────────────┐   │
//! │  │  NotificationCenter: one slot, newest wins, 3 s expiry          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Console configuration (API URL, poll interval, notices)
//! - [`engine`] - `SyncEngine` actor and its `SyncHandle`
//! - [`error`] - Gateway, sync and mutation error types
//! - [`gateway`] - `ResourceGateway` trait and `HttpGateway`
//! - [`notify`] - Single-slot `NotificationCenter`
//! - [`pipeline`] - `MutationPipeline`

pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod pipeline;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::ConsoleConfig;
pub use engine::{RefreshOutcome, SyncEngine, SyncHandle, SyncStatus};
pub use error::{
    FailureKind, GatewayError, GatewayResult, MutationError, MutationResult, SyncError,
    SyncResult,
};
pub use gateway::{HttpGateway, ResourceGateway, SharedGateway};
pub use notify::{Notification, NotificationCenter, Severity};
pub use pipeline::MutationPipeline;
