//! # Webhook Sink
//!
//! POSTs the payload as JSON and reports what the sink answered.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use shelf_core::ExportRow;
use tracing::{error, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::payload::SinkPayload;

/// A successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReceipt {
    pub status: u16,
    pub entries: usize,
    /// Response body, verbatim.
    pub body: String,
    /// Why the body could not be read, if it could not.
    pub body_error: Option<String>,
}

impl SyncReceipt {
    /// Operator-facing summary.
    pub fn message(&self) -> String {
        if let Some(err) = &self.body_error {
            format!("Sent successfully. Response body could not be read: {}", err)
        } else if self.body.is_empty() {
            "Sent successfully.".to_string()
        } else {
            format!("Sent successfully. Response: {}", self.body)
        }
    }
}

/// Destination for ledger snapshots.
#[async_trait]
pub trait SyncSink: Send + Sync {
    async fn deliver(&self, url: &str, rows: &[ExportRow]) -> SyncResult<SyncReceipt>;
}

/// Checks a configured sink URL.
///
/// Empty means not configured; only `http` and `https` are accepted.
pub fn parse_sink_url(raw: &str) -> SyncResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SyncError::MissingUrl);
    }

    let url = Url::parse(raw).map_err(|e| SyncError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SyncError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}

/// Sink that POSTs to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new() -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shelf-counter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(WebhookSink { client })
    }
}

#[async_trait]
impl SyncSink for WebhookSink {
    async fn deliver(&self, url: &str, rows: &[ExportRow]) -> SyncResult<SyncReceipt> {
        let url = parse_sink_url(url)?;
        let body = serde_json::to_vec(&SinkPayload::from_rows(rows))?;

        info!(url = %url, entries = rows.len(), "Sending ledger snapshot");

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Sink unreachable");
                SyncError::from(e)
            })?;

        let status = response.status();
        let (text, body_error) = match response.text().await {
            Ok(text) => (text, None),
            Err(e) => {
                warn!(url = %url, status = status.as_u16(), error = %e, "Sink response body unreadable");
                (String::new(), Some(e.to_string()))
            }
        };

        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "Sink rejected snapshot");
            return Err(SyncError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        info!(status = status.as_u16(), "Snapshot delivered");
        Ok(SyncReceipt {
            status: status.as_u16(),
            entries: rows.len(),
            body: text,
            body_error,
        })
    }
}
