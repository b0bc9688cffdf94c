//! # Export Codecs
//!
//! Encodes export rows into the two file formats an operator can download.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Csv  → timestamp,barcode,qty,description,location                     │
//! │         2024-01-02 03:04:05.678,4006381333931,3,Pens,Aisle 4           │
//! │         (UTC, no zone suffix, RFC 4180 quoting)                        │
//! │                                                                         │
//! │  Xlsx → workbook with one "Counts" worksheet                           │
//! │         Timestamp | Barcode | Qty | Description | Location             │
//! │         (local time as text, Qty as a number)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_xlsxwriter::{RowNum, Workbook, XlsxError};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::ExportRow;

const CSV_HEADER: [&str; 5] = ["timestamp", "barcode", "qty", "description", "location"];
const SHEET_HEADER: [&str; 5] = ["Timestamp", "Barcode", "Qty", "Description", "Location"];

/// Worksheet holding the rows in an xlsx export.
pub const SHEET_NAME: &str = "Counts";

/// File name stem shared by both formats.
pub const EXPORT_FILE_STEM: &str = "shelf_counts";

/// Supported export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-delimited text.
    #[default]
    Csv,
    /// Excel workbook.
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "sheet" => Ok(ExportFormat::Xlsx),
            other => Err(CoreError::Export(format!("unknown export format '{}'", other))),
        }
    }
}

// =============================================================================
// Encoders
// =============================================================================

/// Encodes rows in the given format.
pub fn encode(format: ExportFormat, rows: &[ExportRow]) -> CoreResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(rows).map(String::into_bytes),
        ExportFormat::Xlsx => to_xlsx(rows),
    }
}

/// Encodes rows as comma-delimited text.
pub fn to_csv(rows: &[ExportRow]) -> CoreResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for row in rows {
        let timestamp = row.timestamp_utc();
        let quantity = row.quantity.to_string();
        writer
            .write_record([
                timestamp.as_str(),
                row.barcode.as_str(),
                quantity.as_str(),
                row.description.as_str(),
                row.location.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Export(e.to_string()))
}

/// Encodes rows as an xlsx workbook, built in memory.
pub fn to_xlsx(rows: &[ExportRow]) -> CoreResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

        for (col, title) in (0u16..).zip(SHEET_HEADER) {
            sheet.write_string(0, col, title).map_err(xlsx_error)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let line = RowNum::try_from(index + 1)
                .map_err(|_| CoreError::Export(format!("too many rows for a worksheet: {}", rows.len())))?;
            sheet
                .write_string(line, 0, row.timestamp_local())
                .map_err(xlsx_error)?;
            sheet
                .write_string(line, 1, row.barcode.as_str())
                .map_err(xlsx_error)?;
            sheet
                .write_number(line, 2, row.quantity as f64)
                .map_err(xlsx_error)?;
            sheet
                .write_string(line, 3, row.description.as_str())
                .map_err(xlsx_error)?;
            sheet
                .write_string(line, 4, row.location.as_str())
                .map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn csv_error(err: csv::Error) -> CoreError {
    CoreError::Export(err.to_string())
}

fn xlsx_error(err: XlsxError) -> CoreError {
    CoreError::Export(err.to_string())
}

/// Default file name for an export made on `date`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use shelf_core::export::{export_filename, ExportFormat};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(export_filename(ExportFormat::Csv, date), "shelf_counts_2024-03-09.csv");
/// ```
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_{}.{}",
        EXPORT_FILE_STEM,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
