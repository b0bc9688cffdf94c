//! `send`: delivers a ledger snapshot to the remote sink.

use std::io::Write;

use shelf_sync::{SyncError, SyncSink};

use crate::error::AppResult;
use crate::state::AppState;

/// Sends every entry to `url`, or to the saved sink URL when `None`.
///
/// The ledger is read, never modified.
pub async fn send(
    state: &AppState,
    sink: &dyn SyncSink,
    url: Option<&str>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let url = match url {
        Some(url) => url,
        None => state.prefs.get().sink_url().ok_or(SyncError::MissingUrl)?,
    };

    writeln!(out, "Sending…")?;
    let receipt = sink.deliver(url, &state.ledger.export_rows()).await?;
    writeln!(out, "{}", receipt.message())?;
    Ok(())
}
