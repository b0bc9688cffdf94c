//! # Application Error Type
//!
//! Every command returns `Result<T, AppError>`. Library errors are folded
//! into a machine-readable code plus an operator-facing message.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError / CoreError ───────────────► VALIDATION_ERROR         │
//! │  CoreError::IndexOutOfRange ────────────────► NOT_FOUND                │
//! │  DbError / StoreError::Persist ─────────────► DATABASE_ERROR           │
//! │  CameraError / ScanError ───────────────────► DEVICE_ERROR             │
//! │  SyncError ─────────────────────────────────► SYNC_ERROR               │
//! │  ConfigError ───────────────────────────────► CONFIG_ERROR             │
//! │  io::Error and anything unexpected ─────────► INTERNAL                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database details are logged, not shown: the operator gets a short message
//! and the log keeps the cause.

use serde::Serialize;
use shelf_core::{CoreError, ValidationError};
use shelf_db::{DbError, StoreError};
use shelf_scan::{CameraError, ScanError};
use shelf_sync::SyncError;

use crate::config::ConfigError;

/// Result type alias for commands.
pub type AppResult<T> = Result<T, AppError>;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "No entry at position 7 (ledger has 3 entries)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Operator input rejected
    ValidationError,

    /// No entry at the given position
    NotFound,

    /// Persisted state could not be read or written
    DatabaseError,

    /// Capture device could not be acquired
    DeviceError,

    /// Remote sink delivery failed
    SyncError,

    /// Configuration unusable
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::DeviceError => "DEVICE_ERROR",
            ErrorCode::SyncError => "SYNC_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    /// Process exit status for this kind of failure.
    pub fn exit_status(&self) -> u8 {
        match self {
            ErrorCode::ValidationError | ErrorCode::NotFound => 2,
            ErrorCode::ConfigError => 78,
            _ => 1,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error for a 1-based ledger position.
    pub fn no_entry(position: u64, len: usize) -> Self {
        AppError::new(
            ErrorCode::NotFound,
            format!("No entry at position {} (ledger has {} entries)", position, len),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn device(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::DeviceError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IndexOutOfRange { index, len } => {
                AppError::no_entry(index as u64 + 1, len)
            }
            CoreError::Validation(e) => e.into(),
            CoreError::Export(message) => AppError::internal(message),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, format!("Cannot open database: {}", e))
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::CorruptRecord { key, message } => {
                tracing::error!(key = %key, "Stored record unreadable: {}", message);
                AppError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored record '{}' is unreadable; it was left untouched", key),
                )
            }
            DbError::Locked => AppError::new(
                ErrorCode::DatabaseError,
                "Database is busy in another shelf-counter process; try again",
            ),
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => e.into(),
            StoreError::Persist(e) => e.into(),
        }
    }
}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::device(format!("Camera error: {}", err))
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError::device(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let code = match err {
            SyncError::MissingUrl | SyncError::InvalidUrl(_) => ErrorCode::ValidationError,
            _ => ErrorCode::SyncError,
        };
        AppError::new(code, format!("Send failed: {}", err))
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let err: AppError = CoreError::IndexOutOfRange { index: 4, len: 2 }.into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "No entry at position 5 (ledger has 2 entries)");
    }

    #[test]
    fn test_store_rejection_keeps_validation_message() {
        let err: AppError = StoreError::Rejected(ValidationError::NotNumeric.into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Strict mode: barcode must be numeric.");
    }

    #[test]
    fn test_sync_failures_read_send_failed() {
        let err: AppError = SyncError::Status {
            status: 403,
            body: "denied".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::SyncError);
        assert_eq!(err.message, "Send failed: HTTP 403");
        assert_eq!(err.to_string(), "[SYNC_ERROR] Send failed: HTTP 403");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&AppError::device("no camera")).unwrap();
        assert_eq!(json, r#"{"code":"DEVICE_ERROR","message":"no camera"}"#);
    }
}
