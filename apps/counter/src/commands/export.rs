//! `export`: writes the ledger as delimited text or an xlsx workbook.

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use shelf_core::export::{encode, export_filename};
use tracing::info;

use crate::cli::ExportArgs;
use crate::error::AppResult;
use crate::state::AppState;

pub async fn export(state: &AppState, args: ExportArgs, out: &mut dyn Write) -> AppResult<()> {
    let rows = state.ledger.export_rows();
    let bytes = encode(args.format, &rows)?;

    let path: PathBuf = args.output.unwrap_or_else(|| {
        state
            .config
            .export_dir()
            .join(export_filename(args.format, Local::now().date_naive()))
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes).await?;

    info!(?path, format = %args.format, rows = rows.len(), "Ledger exported");
    writeln!(out, "Exported {} entries to {}", rows.len(), path.display())?;
    Ok(())
}
