//! # Sync Error Types
//!
//! Error types for the gateway, the sync engine and the mutation pipeline.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Console Failure Taxonomy                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Gateway       │  │     Engine / Config     │ │
//! │  │  (no network)   │  │  (one request)  │  │                         │ │
//! │  │                 │  │                 │  │  DataLoadFailed         │ │
//! │  │ ValidationFailed│  │ NetworkUnavail. │  │  InvalidConfig          │ │
//! │  │ StaleReference  │  │ ServerError     │  │  ShuttingDown           │ │
//! │  │                 │  │ MalformedResp.  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Local errors → highlight a field / the stale row                      │
//! │  Gateway errors → one `danger` notification, no automatic retry        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use krabby_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Failure Kind
// =============================================================================

/// Machine-readable failure category, carried on notifications so the
/// presentation layer can decide how to render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    ValidationFailed,
    NetworkUnavailable,
    ServerError,
    MalformedResponse,
    StaleReference,
    DataLoadFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::ValidationFailed => "validation_failed",
            FailureKind::NetworkUnavailable => "network_unavailable",
            FailureKind::ServerError => "server_error",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::StaleReference => "stale_reference",
            FailureKind::DataLoadFailed => "data_load_failed",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Result type alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure of a single request against the restaurant API.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout, reset.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The API answered with a non-2xx status.
    #[error("Server returned {status}: {body}")]
    ServerError { status: u16, body: String },

    /// The payload did not match the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::NetworkUnavailable(_) => FailureKind::NetworkUnavailable,
            GatewayError::ServerError { .. } => FailureKind::ServerError,
            GatewayError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}

// =============================================================================
// Sync Errors
// =============================================================================

/// Result type alias for engine and configuration operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// API base address does not parse or uses an unsupported scheme.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Refresh Errors
    // =========================================================================
    /// One of the four refresh reads failed; the snapshot was left as is.
    #[error("Failed to load data: {0}")]
    DataLoadFailed(#[source] GatewayError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The sync engine task is gone.
    #[error("Sync engine is shutting down")]
    ShuttingDown,

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_) | SyncError::InvalidUrl(_) | SyncError::ConfigLoadFailed(_)
        )
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Result type alias for mutation pipeline operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Why a submit or toggle did not go through.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The draft failed local validation; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The table is not in the snapshot the console holds; nothing was sent.
    #[error("Table {table_id} is no longer in the current snapshot")]
    StaleReference { table_id: i64 },

    /// The request was sent and failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl MutationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MutationError::Validation(_) => FailureKind::ValidationFailed,
            MutationError::StaleReference { .. } => FailureKind::StaleReference,
            MutationError::Gateway(e) => e.kind(),
        }
    }

    /// True when the failure never left the process.
    pub fn is_local(&self) -> bool {
        !matches!(self, MutationError::Gateway(_))
    }

    /// Form field to highlight, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            MutationError::Validation(e) => Some(e.field()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_kinds() {
        assert_eq!(
            GatewayError::NetworkUnavailable("refused".into()).kind(),
            FailureKind::NetworkUnavailable
        );
        assert_eq!(
            GatewayError::ServerError {
                status: 500,
                body: "boom".into()
            }
            .kind(),
            FailureKind::ServerError
        );
        assert_eq!(
            GatewayError::MalformedResponse("eof".into()).kind(),
            FailureKind::MalformedResponse
        );
    }

    #[test]
    fn test_serde_error_is_malformed() {
        let err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        assert!(matches!(
            GatewayError::from(err),
            GatewayError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_mutation_error_locality() {
        let validation = MutationError::from(ValidationError::Required {
            field: "customer_name".into(),
        });
        assert!(validation.is_local());
        assert_eq!(validation.field(), Some("customer_name"));
        assert_eq!(validation.kind(), FailureKind::ValidationFailed);

        let stale = MutationError::StaleReference { table_id: 4 };
        assert!(stale.is_local());
        assert_eq!(stale.kind(), FailureKind::StaleReference);

        let remote = MutationError::from(GatewayError::NetworkUnavailable("down".into()));
        assert!(!remote.is_local());
        assert_eq!(remote.field(), None);
        assert_eq!(remote.kind(), FailureKind::NetworkUnavailable);
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidConfig("x".into()).is_config_error());
        assert!(!SyncError::ShuttingDown.is_config_error());
    }
}
