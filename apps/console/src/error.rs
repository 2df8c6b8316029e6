//! # Console Error Type
//!
//! Unified error type for operator commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  parse(line) ── unknown verb / bad number ──► UNKNOWN_COMMAND           │
//! │       │                                       INVALID_ARGUMENT          │
//! │       ▼                                                                 │
//! │  execute(command)                                                       │
//! │       │                                                                 │
//! │       ├─ MutationError::Validation ─────────► VALIDATION_ERROR (field)  │
//! │       ├─ MutationError::StaleReference ─────► STALE_REFERENCE           │
//! │       ├─ MutationError::Gateway ────────────► NETWORK_UNAVAILABLE       │
//! │       │                                       SERVER_ERROR              │
//! │       │                                       MALFORMED_RESPONSE        │
//! │       └─ SyncError ─────────────────────────► DATA_LOAD_FAILED / CONFIG │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use krabby_sync::{FailureKind, MutationError, SyncError};
use thiserror::Error;

/// Machine-readable error codes, printed in front of every error line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A draft field failed validation; nothing was sent.
    ValidationError,

    /// The command named a table the console does not know about.
    StaleReference,

    NetworkUnavailable,
    ServerError,
    MalformedResponse,

    /// A refresh failed; the previous data is still shown.
    DataLoadFailed,

    /// Startup configuration problem.
    Config,

    UnknownCommand,
    InvalidArgument,

    /// The sync engine is gone.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StaleReference => "STALE_REFERENCE",
            ErrorCode::NetworkUnavailable => "NETWORK_UNAVAILABLE",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorCode::DataLoadFailed => "DATA_LOAD_FAILED",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FailureKind> for ErrorCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::ValidationFailed => ErrorCode::ValidationError,
            FailureKind::StaleReference => ErrorCode::StaleReference,
            FailureKind::NetworkUnavailable => ErrorCode::NetworkUnavailable,
            FailureKind::ServerError => ErrorCode::ServerError,
            FailureKind::MalformedResponse => ErrorCode::MalformedResponse,
            FailureKind::DataLoadFailed => ErrorCode::DataLoadFailed,
        }
    }
}

/// Error returned from command parsing and execution.
#[derive(Debug, Clone, Error)]
#[error("error[{code}]: {message}")]
pub struct ConsoleError {
    pub code: ErrorCode,
    pub message: String,
}

impl ConsoleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ConsoleError {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_command(verb: &str) -> Self {
        ConsoleError::new(
            ErrorCode::UnknownCommand,
            format!("unknown command '{}' (try 'help')", verb),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::InvalidArgument, message)
    }
}

impl From<MutationError> for ConsoleError {
    fn from(err: MutationError) -> Self {
        ConsoleError::new(err.kind().into(), err.to_string())
    }
}

impl From<SyncError> for ConsoleError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::DataLoadFailed(_) => ErrorCode::DataLoadFailed,
            e if e.is_config_error() => ErrorCode::Config,
            _ => ErrorCode::Internal,
        };
        ConsoleError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krabby_core::ValidationError;
    use krabby_sync::GatewayError;

    #[test]
    fn test_mutation_errors_map_to_codes() {
        let err: ConsoleError = MutationError::from(ValidationError::Required {
            field: "phone_number".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(
            err.to_string(),
            "error[VALIDATION_ERROR]: Validation failed: phone_number is required"
        );

        let err: ConsoleError = MutationError::StaleReference { table_id: 9 }.into();
        assert_eq!(err.code, ErrorCode::StaleReference);

        let err: ConsoleError =
            MutationError::from(GatewayError::MalformedResponse("eof".into())).into();
        assert_eq!(err.code, ErrorCode::MalformedResponse);
    }

    #[test]
    fn test_sync_errors_map_to_codes() {
        let err: ConsoleError =
            SyncError::DataLoadFailed(GatewayError::NetworkUnavailable("down".into())).into();
        assert_eq!(err.code, ErrorCode::DataLoadFailed);

        let err: ConsoleError = SyncError::InvalidUrl("ftp://x".into()).into();
        assert_eq!(err.code, ErrorCode::Config);

        let err: ConsoleError = SyncError::ShuttingDown.into();
        assert_eq!(err.code, ErrorCode::Internal);
    }
}
