//! # Domain Types
//!
//! Core data model used throughout Shelf Counter.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  EntryDraft ──(validate)──► CountEntry ──(project)──► ExportRow         │
//! │  raw operator input          persisted, ordered        read-only row    │
//! │                                                                         │
//! │  EntryEdit  ──(validate)──► replaces qty/desc/loc of a CountEntry       │
//! │                                                                         │
//! │  Preferences: default location • strict flag • sink URL                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Field Names
//! Records keep the short field names of the stored format
//! (`ts`, `qty`, `desc`, `loc`, `defaultLoc`, `webhook`) so existing data
//! keeps loading.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

// =============================================================================
// Count Entry
// =============================================================================

/// One counted line: a barcode, how many were counted, and where.
///
/// ## Invariants
/// - `barcode` is non-empty (trimmed)
/// - `quantity` is non-negative by type; negative input is rejected before
///   an entry is ever constructed
/// - `timestamp` and `barcode` never change after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(rename = "ts")]
    pub timestamp: i64,

    /// Scanned or manually entered code.
    pub barcode: String,

    /// Counted quantity.
    #[serde(rename = "qty")]
    pub quantity: u64,

    /// Optional free-text description.
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional location (aisle, shelf, back room...).
    #[serde(rename = "loc", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CountEntry {
    /// Projects the entry into an export row.
    pub fn to_row(&self) -> ExportRow {
        ExportRow {
            timestamp: self.timestamp,
            barcode: self.barcode.clone(),
            quantity: self.quantity,
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Operator Input
// =============================================================================

/// Unvalidated input for a new entry.
///
/// `quantity` is signed so that negative input can be represented and
/// rejected rather than clamped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub barcode: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EntryDraft {
    /// Creates a draft with only the required fields.
    pub fn new(barcode: impl Into<String>, quantity: i64) -> Self {
        EntryDraft {
            barcode: barcode.into(),
            quantity,
            description: None,
            location: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Replacement values for an existing entry.
///
/// Timestamp and barcode are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub quantity: i64,
    pub description: Option<String>,
    pub location: Option<String>,
}

// =============================================================================
// Export Row
// =============================================================================

/// Read-only projection of an entry for encoders and the remote sink.
///
/// Absent description/location are projected as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub timestamp: i64,
    pub barcode: String,
    pub quantity: u64,
    pub description: String,
    pub location: String,
}

impl ExportRow {
    /// UTC timestamp as `YYYY-MM-DD HH:MM:SS.mmm` (no timezone suffix).
    pub fn timestamp_utc(&self) -> String {
        match DateTime::from_timestamp_millis(self.timestamp) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            None => self.timestamp.to_string(),
        }
    }

    /// Local-time timestamp as `YYYY-MM-DD HH:MM:SS`, for the xlsx export.
    pub fn timestamp_local(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.timestamp_utc(),
        }
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Process-wide operator preferences.
///
/// Loaded once at startup and saved immediately after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Location applied to entries added without one.
    #[serde(rename = "defaultLoc", default)]
    pub default_location: String,

    /// Require a valid EAN-8/UPC-A/EAN-13 checksum before accepting a code.
    #[serde(default)]
    pub strict: bool,

    /// Remote sink URL.
    #[serde(rename = "webhook", default)]
    pub sink_url: String,
}

impl Preferences {
    /// Resolves the location for a new entry: the explicit value if
    /// non-empty, else the default location if non-empty.
    pub fn resolve_location(&self, explicit: Option<&str>) -> Option<String> {
        non_empty(explicit).or_else(|| non_empty(Some(&self.default_location)))
    }

    /// Returns the configured sink URL, if any.
    pub fn sink_url(&self) -> Option<&str> {
        let url = self.sink_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Trims a value and maps empty results to `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_uses_stored_field_names() {
        let entry = CountEntry {
            timestamp: 1_700_000_000_000,
            barcode: "4006381333931".to_string(),
            quantity: 12,
            description: Some("Pens".to_string()),
            location: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["ts"], 1_700_000_000_000_i64);
        assert_eq!(json["qty"], 12);
        assert_eq!(json["desc"], "Pens");
        assert!(json.get("loc").is_none());
    }

    #[test]
    fn test_entry_loads_null_and_missing_optionals() {
        let json = r#"{"ts":1,"barcode":"A","qty":0,"desc":null}"#;
        let entry: CountEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.description, None);
        assert_eq!(entry.location, None);
    }

    #[test]
    fn test_negative_stored_quantity_is_rejected() {
        let json = r#"{"ts":1,"barcode":"A","qty":-3}"#;
        assert!(serde_json::from_str::<CountEntry>(json).is_err());
    }

    #[test]
    fn test_preferences_defaults_for_missing_fields() {
        let prefs: Preferences = serde_json::from_str(r#"{"strict":true}"#).unwrap();
        assert!(prefs.strict);
        assert_eq!(prefs.default_location, "");
        assert_eq!(prefs.sink_url(), None);
    }

    #[test]
    fn test_resolve_location() {
        let prefs = Preferences {
            default_location: "Aisle 4".to_string(),
            ..Preferences::default()
        };
        assert_eq!(prefs.resolve_location(Some(" Back room ")), Some("Back room".into()));
        assert_eq!(prefs.resolve_location(Some("  ")), Some("Aisle 4".into()));
        assert_eq!(prefs.resolve_location(None), Some("Aisle 4".into()));
        assert_eq!(Preferences::default().resolve_location(None), None);
    }

    #[test]
    fn test_export_row_timestamp_has_no_zone_suffix() {
        let row = ExportRow {
            timestamp: 1_704_164_645_678, // 2024-01-02T03:04:05.678Z
            barcode: "X".into(),
            quantity: 1,
            description: String::new(),
            location: String::new(),
        };
        assert_eq!(row.timestamp_utc(), "2024-01-02 03:04:05.678");
    }
}
