//! # krabby-core: Entity Model for the Krabby Console
//!
//! Pure data definitions and legality rules for what the front-of-house
//! console shows: tables, reservations, the walk-in waitlist and the
//! dashboard summary. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Krabby Console Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/console (operator)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     krabby-sync: gateway, sync engine, mutations, notices       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ krabby-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │ snapshot  │  │ validation│                  │   │
//! │  │   │  Table    │  │ Snapshot  │  │  drafts   │                  │   │
//! │  │   │  Reserv.  │  │  queue    │  │  fields   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, statuses, drafts and request bodies
//! - [`snapshot`] - The four-collection snapshot and queries over it
//! - [`validation`] - Draft validation and predicates
//! - [`error`] - Domain error types

pub mod error;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use snapshot::{QueuedParty, Snapshot};
pub use types::*;
pub use validation::{is_valid_party_size, is_valid_reservation_draft, is_valid_waitlist_draft};
