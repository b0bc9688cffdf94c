//! # Commands
//!
//! One function per subcommand. Each writes its report to `out` and returns
//! `AppResult`; `main` decides how failures are shown.
//!
//! ```text
//! entry.rs    add, edit, remove, clear, list
//! export.rs   export
//! sync.rs     send
//! prefs.rs    prefs show, prefs set
//! scan.rs     cameras, scan
//! check.rs    check
//! ```

pub mod check;
pub mod entry;
pub mod export;
pub mod prefs;
pub mod scan;
pub mod sync;

use std::io::Write;
use std::sync::Arc;

use shelf_scan::{WedgeCamera, WedgeRuntime};
use shelf_sync::WebhookSink;

use crate::cli::{Command, PrefsCommand};
use crate::error::AppResult;
use crate::state::AppState;

/// Runs one command against the opened state.
pub async fn dispatch(command: Command, state: &mut AppState, out: &mut dyn Write) -> AppResult<()> {
    match command {
        Command::Add(args) => entry::add(state, args, out).await,
        Command::Edit(args) => entry::edit(state, args, out).await,
        Command::Remove { position } => entry::remove(state, position, out).await,
        Command::Clear { yes } => entry::clear(state, yes, out).await,
        Command::List => entry::list(state, out),
        Command::Export(args) => export::export(state, args, out).await,
        Command::Send { url } => {
            let sink = WebhookSink::new()?;
            sync::send(state, &sink, url.as_deref(), out).await
        }
        Command::Prefs(PrefsCommand::Show { json }) => prefs::show(state, json, out),
        Command::Prefs(PrefsCommand::Set {
            default_location,
            strict,
            sink_url,
        }) => {
            let change = prefs::PrefsChange {
                default_location,
                strict,
                sink_url,
            };
            prefs::set(state, change, out).await
        }
        Command::Cameras => {
            let camera = Arc::new(WedgeCamera::new(state.config.wedge_devices()));
            scan::cameras(camera, out).await
        }
        Command::Scan(args) => {
            let camera = Arc::new(WedgeCamera::new(state.config.wedge_devices()));
            let shutdown = async {
                // Without a signal handler, a scan only ends with its feed.
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            scan::scan(state, camera, Arc::new(WedgeRuntime), args, shutdown, out)
                .await
                .map(|_| ())
        }
        Command::Check { code } => check::check(&code, out),
    }
}
