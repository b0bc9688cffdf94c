//! # shelf-sync: Remote Sink for Shelf Counter
//!
//! Sends the whole ledger to a collector the operator configured, in one
//! request, on demand.
//!
//! ## Usage
//! ```rust,ignore
//! use shelf_sync::{SyncSink, WebhookSink};
//!
//! let sink = WebhookSink::new()?;
//! let receipt = sink.deliver(prefs.get().sink_url.as_str(), &ledger.export_rows()).await?;
//! println!("{}", receipt.message());
//! ```

pub mod error;
pub mod payload;
pub mod sink;

pub use error::{SyncError, SyncResult};
pub use payload::{SinkEntry, SinkPayload};
pub use sink::{parse_sink_url, SyncReceipt, SyncSink, WebhookSink};
