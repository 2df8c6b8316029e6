//! # Error Types
//!
//! Domain-specific error types for krabby-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  krabby-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Field-level draft failures                     │
//! │                                                                         │
//! │  krabby-sync errors (separate crate)                                   │
//! │  ├── GatewayError     - Network / server / decode failures             │
//! │  └── MutationError    - What a submit returns to the console           │
//! │                                                                         │
//! │  Flow: ValidationError → MutationError → highlighted form field        │
//! │        GatewayError    → MutationError → danger notification           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations that are not tied to a single form field.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A table id is not part of the snapshot the console currently holds.
    #[error("Table {0} is not in the current snapshot")]
    UnknownTable(i64),

    /// A reservation moved backwards or out of a terminal status.
    #[error("Reservation {id} cannot move from {from} to {to}")]
    IllegalReservationTransition {
        id: i64,
        from: String,
        to: String,
    },

    /// A reservation points at a table the same snapshot does not contain.
    #[error("Reservation {reservation_id} references unknown table {table_id}")]
    DanglingTableReference { reservation_id: i64, table_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so a form can highlight it
/// instead of showing a transient banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be at least one.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. unparseable time, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
