//! # Sink Payload
//!
//! ```json
//! { "entries": [ { "ts": 1704164645678, "barcode": "4006381333931",
//!                  "qty": 3, "desc": "Pens", "loc": "Aisle 4" } ] }
//! ```
//!
//! `desc` and `loc` are always strings, empty when absent.

use serde::Serialize;
use shelf_core::ExportRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkEntry<'a> {
    pub ts: i64,
    pub barcode: &'a str,
    pub qty: u64,
    pub desc: &'a str,
    pub loc: &'a str,
}

impl<'a> From<&'a ExportRow> for SinkEntry<'a> {
    fn from(row: &'a ExportRow) -> Self {
        SinkEntry {
            ts: row.timestamp,
            barcode: &row.barcode,
            qty: row.quantity,
            desc: &row.description,
            loc: &row.location,
        }
    }
}

/// Request body for the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkPayload<'a> {
    pub entries: Vec<SinkEntry<'a>>,
}

impl<'a> SinkPayload<'a> {
    pub fn from_rows(rows: &'a [ExportRow]) -> Self {
        SinkPayload {
            entries: rows.iter().map(SinkEntry::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let rows = vec![ExportRow {
            timestamp: 7,
            barcode: "A".into(),
            quantity: 2,
            description: String::new(),
            location: "Back".into(),
        }];

        let json = serde_json::to_string(&SinkPayload::from_rows(&rows)).unwrap();
        assert_eq!(
            json,
            r#"{"entries":[{"ts":7,"barcode":"A","qty":2,"desc":"","loc":"Back"}]}"#
        );
    }

    #[test]
    fn test_empty_ledger_sends_empty_list() {
        let json = serde_json::to_string(&SinkPayload::from_rows(&[])).unwrap();
        assert_eq!(json, r#"{"entries":[]}"#);
    }
}
