//! # Sync Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Configuration      MissingUrl • InvalidUrl                            │
//! │  Transport          Request (DNS, TLS, connection reset, ...)          │
//! │  Remote             Status (non-2xx, body kept for the operator)       │
//! │  Encoding           Serialization                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant leaves the ledger untouched; retrying is a manual resend.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// No sink URL is configured.
    #[error("No sink URL configured. Set one with `prefs set --sink-url <url>`.")]
    MissingUrl,

    /// The URL does not parse, or is not http/https.
    #[error("Invalid sink URL: {0}")]
    InvalidUrl(String),

    /// The request never got a response.
    #[error("{0}")]
    Request(String),

    /// The sink answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// The payload could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl SyncError {
    /// Returns true if resending unchanged could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Request(_) => true,
            SyncError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_is_short() {
        let err = SyncError::Status {
            status: 404,
            body: "<html>…</html>".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404");
        assert!(!err.is_retryable());
        assert!(SyncError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(!SyncError::MissingUrl.is_retryable());
    }
}
