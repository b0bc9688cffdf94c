//! `cameras` and `scan`.
//!
//! ## Scan Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScannerEngine ──ChannelSink──► rx ──► select! ◄── shutdown (Ctrl-C)   │
//! │                                          │                              │
//! │   Detected(code) ─► InventoryLedger::append                            │
//! │                      ├─ Ok        report "Added #n"                    │
//! │                      ├─ Rejected  report, keep scanning                │
//! │                      └─ Persist   stop, return the error               │
//! │   Status(msg)    ─► print                                              │
//! │   FeedEnded      ─► stop                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use shelf_core::EntryDraft;
use shelf_db::StoreError;
use shelf_scan::{
    Backend, CameraSource, ChannelSink, DecoderRuntime, DeviceList, ScanEvent, ScannerEngine,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::ScanArgs;
use crate::commands::entry::{describe, quantity_arg};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Counts from one scan session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub added: usize,
    pub rejected: usize,
}

pub async fn cameras(camera: Arc<dyn CameraSource>, out: &mut dyn Write) -> AppResult<()> {
    let mut list = DeviceList::new(camera);
    list.refresh().await;

    if list.devices().is_empty() {
        writeln!(out, "No devices found.")?;
        return Ok(());
    }

    for device in list.devices() {
        let marker = if list.selected() == Some(device.id.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(out, "{} {:<12} {}", marker, device.id, device.label)?;
    }
    Ok(())
}

/// Runs the scanner until the feed ends or `shutdown` completes.
pub async fn scan(
    state: &mut AppState,
    camera: Arc<dyn CameraSource>,
    runtime: Arc<dyn DecoderRuntime>,
    args: ScanArgs,
    shutdown: impl Future<Output = ()>,
    out: &mut dyn Write,
) -> AppResult<ScanSummary> {
    let quantity = quantity_arg(&args.qty)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera,
        runtime,
        Arc::new(ChannelSink::new(tx)),
        state.config.engine_settings(),
    );

    let backend = match engine.start(args.device.as_deref()).await {
        Ok(backend) => backend,
        Err(e) => {
            drain_status(&mut rx, out)?;
            return Err(e.into());
        }
    };
    if backend == Backend::ManualOnly {
        engine.stop().await;
        drain_status(&mut rx, out)?;
        writeln!(out, "No decoder available. Record codes with `add`.")?;
        return Ok(ScanSummary::default());
    }

    let mut summary = ScanSummary::default();
    let mut failure = None;
    tokio::pin!(shutdown);

    loop {
        let event = tokio::select! {
            _ = &mut shutdown => {
                info!("Scan interrupted");
                break;
            }
            event = rx.recv() => event,
        };

        match event {
            Some(ScanEvent::Detected(code)) => {
                let mut draft = EntryDraft::new(code.clone(), quantity);
                draft.description = args.desc.clone();
                draft.location = args.loc.clone();

                match state.ledger.append(draft, state.prefs.get()).await {
                    Ok(entry) => {
                        summary.added += 1;
                        writeln!(out, "Added #{}: {}", state.ledger.len(), describe(&entry))?;
                    }
                    Err(StoreError::Rejected(e)) => {
                        summary.rejected += 1;
                        warn!(barcode = %code, error = %e, "Scanned code rejected");
                        writeln!(out, "Rejected {}: {}", code, AppError::from(e).message)?;
                    }
                    Err(e @ StoreError::Persist(_)) => {
                        failure = Some(AppError::from(e));
                        break;
                    }
                }
            }
            Some(ScanEvent::Status(message)) => writeln!(out, "{}", message)?,
            Some(ScanEvent::FeedEnded) | None => break,
        }
    }

    engine.stop().await;
    drain_status(&mut rx, out)?;

    if let Some(err) = failure {
        return Err(err);
    }

    info!(added = summary.added, rejected = summary.rejected, "Scan finished");
    writeln!(
        out,
        "{} added, {} rejected.",
        summary.added, summary.rejected
    )?;
    Ok(summary)
}

/// Prints status lines already queued. Called once decoding has stopped;
/// detections still queued at that point are discarded.
fn drain_status(rx: &mut mpsc::UnboundedReceiver<ScanEvent>, out: &mut dyn Write) -> AppResult<()> {
    while let Ok(event) = rx.try_recv() {
        if let ScanEvent::Status(message) = event {
            writeln!(out, "{}", message)?;
        }
    }
    Ok(())
}
