//! # Persistence Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← storage failed (connection, query, corrupt record)          │
//! │       │                                                                 │
//! │       │        CoreError ← operation rejected before any write          │
//! │       │            │                                                    │
//! │       ▼            ▼                                                    │
//! │  StoreError (returned by InventoryLedger / PreferencesStore)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in the counter app) ← code + message for the operator       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shelf_core::CoreError;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened.
    ///
    /// ## When This Occurs
    /// - The configured directory does not exist or is not writable
    /// - The file is not a SQLite database
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// Another process kept the write lock past the busy timeout.
    #[error("Database is locked by another shelf-counter process")]
    Locked,

    /// SQLite rejected a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No pooled connection became free in time.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored record exists but does not parse.
    ///
    /// ## When This Occurs
    /// - The database was edited by hand
    /// - A newer build wrote a shape this build does not understand
    ///
    /// The record is left untouched so nothing is overwritten.
    #[error("Stored record '{key}' is unreadable: {message}")]
    CorruptRecord { key: String, message: String },

    /// A record could not be encoded for writing.
    #[error("Cannot encode record: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

/// SQLite primary result codes that mean "someone else holds the lock".
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";

impl DbError {
    /// Creates a CorruptRecord error for the given key.
    pub fn corrupt(key: impl Into<String>, message: impl ToString) -> Self {
        DbError::CorruptRecord {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// ```text
/// SQLITE_BUSY / SQLITE_LOCKED  → Locked
/// other database error         → QueryFailed
/// PoolTimedOut                 → PoolExhausted
/// PoolClosed                   → ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => DbError::Locked,
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("database already closed".into()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Store Error
// =============================================================================

/// Errors from the write-through services.
///
/// Either the operation was rejected (nothing written, nothing changed) or
/// the write failed (in-memory state rolled back to the last saved state).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Persist(#[from] DbError),
}

/// Result type for the write-through services.
pub type StoreResult<T> = Result<T, StoreError>;
