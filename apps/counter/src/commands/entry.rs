//! Ledger commands: add, edit, remove, clear, list.

use std::io::Write;

use shelf_core::validation::parse_quantity;
use shelf_core::{CountEntry, EntryDraft, EntryEdit, ValidationError};
use tracing::debug;

use crate::cli::{AddArgs, EditArgs};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Parses an operator-typed quantity into the signed form drafts carry.
pub(crate) fn quantity_arg(raw: &str) -> AppResult<i64> {
    let qty = parse_quantity(raw)?;
    i64::try_from(qty).map_err(|_| ValidationError::invalid_quantity(raw.trim()).into())
}

/// Converts a 1-based position to a ledger index, checking it exists.
fn index_of(state: &AppState, position: u64) -> AppResult<usize> {
    let len = state.ledger.len();
    position
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|i| *i < len)
        .ok_or_else(|| AppError::no_entry(position, len))
}

pub async fn add(state: &mut AppState, args: AddArgs, out: &mut dyn Write) -> AppResult<()> {
    let draft = EntryDraft {
        barcode: args.barcode,
        quantity: quantity_arg(&args.qty)?,
        description: args.desc,
        location: args.loc,
    };

    let entry = state.ledger.append(draft, state.prefs.get()).await?;
    writeln!(out, "Added #{}: {}", state.ledger.len(), describe(&entry))?;
    Ok(())
}

pub async fn edit(state: &mut AppState, args: EditArgs, out: &mut dyn Write) -> AppResult<()> {
    let index = index_of(state, args.position)?;
    let Some(current) = state.ledger.entries().get(index) else {
        return Err(AppError::no_entry(args.position, state.ledger.len()));
    };

    let quantity = match args.qty.as_deref() {
        Some(raw) => quantity_arg(raw)?,
        None => i64::try_from(current.quantity)
            .map_err(|_| ValidationError::invalid_quantity(current.quantity))?,
    };
    let edit = EntryEdit {
        quantity,
        description: args.desc.or_else(|| current.description.clone()),
        location: args.loc.or_else(|| current.location.clone()),
    };
    debug!(index, ?edit, "Editing entry");

    let entry = state.ledger.update(index, edit).await?;
    writeln!(out, "Updated #{}: {}", args.position, describe(&entry))?;
    Ok(())
}

pub async fn remove(state: &mut AppState, position: u64, out: &mut dyn Write) -> AppResult<()> {
    let index = index_of(state, position)?;
    let removed = state.ledger.remove(index).await?;
    writeln!(out, "Removed #{}: {}", position, describe(&removed))?;
    Ok(())
}

pub async fn clear(state: &mut AppState, confirmed: bool, out: &mut dyn Write) -> AppResult<()> {
    if !confirmed {
        return Err(AppError::validation(
            "Clearing deletes every entry and cannot be undone. Re-run with --yes.",
        ));
    }

    let removed = state.ledger.clear().await?;
    if removed == 0 {
        writeln!(out, "Ledger is already empty.")?;
    } else {
        writeln!(out, "Cleared {} entries.", removed)?;
    }
    Ok(())
}

pub fn list(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let rows = state.ledger.export_rows();
    if rows.is_empty() {
        writeln!(out, "No entries.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>4}  {:<19}  {:<16}  {:>6}  {:<20}  Location",
        "#", "Time", "Barcode", "Qty", "Description"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<19}  {:<16}  {:>6}  {:<20}  {}",
            i + 1,
            row.timestamp_local(),
            row.barcode,
            row.quantity,
            row.description,
            row.location
        )?;
    }
    writeln!(out, "{} entries", rows.len())?;
    Ok(())
}

/// One-line summary used in command reports.
pub(crate) fn describe(entry: &CountEntry) -> String {
    let mut line = format!("{} x{}", entry.barcode, entry.quantity);
    if let Some(desc) = &entry.description {
        line.push_str(&format!(" \"{}\"", desc));
    }
    if let Some(loc) = &entry.location {
        line.push_str(&format!(" @ {}", loc));
    }
    line
}
