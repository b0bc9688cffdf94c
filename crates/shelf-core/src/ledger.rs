//! # Inventory Ledger
//!
//! The ordered, in-memory sequence of count entries.
//!
//! ## Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  position:   0          1          2                                   │
//! │            ┌────────┐ ┌────────┐ ┌────────┐                            │
//! │  entries:  │ entry  │ │ entry  │ │ entry  │ ◄── append() adds here     │
//! │            └────────┘ └────────┘ └────────┘                            │
//! │                                                                         │
//! │  insertion order = display order = export order                        │
//! │  remove(1) shifts entry 2 down to position 1                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This type holds no I/O. The write-through wrapper in `shelf-db` persists
//! the whole ledger after every successful mutation. Every operation here
//! validates first and mutates second, so a rejected call leaves the ledger
//! exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{non_empty, CountEntry, EntryDraft, EntryEdit, ExportRow, Preferences};
use crate::validation::{validate_barcode, validate_quantity};

/// Ordered list of count entries.
///
/// Serializes as a plain JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<CountEntry>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Rebuilds a ledger from already-stored entries.
    pub fn from_entries(entries: Vec<CountEntry>) -> Self {
        Ledger { entries }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates a draft and appends it as a new entry.
    ///
    /// ## Steps
    /// 1. Trim and check the barcode (strict checksum when `prefs.strict`)
    /// 2. Reject a negative quantity
    /// 3. Resolve the location against `prefs.default_location`
    /// 4. Stamp `now_ms` and push to the end
    pub fn append(
        &mut self,
        draft: EntryDraft,
        prefs: &Preferences,
        now_ms: i64,
    ) -> CoreResult<&CountEntry> {
        let barcode = validate_barcode(&draft.barcode, prefs.strict)?;
        let quantity = validate_quantity(draft.quantity)?;

        self.entries.push(CountEntry {
            timestamp: now_ms,
            barcode,
            quantity,
            description: non_empty(draft.description.as_deref()),
            location: prefs.resolve_location(draft.location.as_deref()),
        });

        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Replaces quantity, description and location of the entry at `index`.
    ///
    /// Timestamp and barcode are preserved.
    pub fn update(&mut self, index: usize, edit: EntryEdit) -> CoreResult<&CountEntry> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;

        let quantity = validate_quantity(edit.quantity)?;

        entry.quantity = quantity;
        entry.description = non_empty(edit.description.as_deref());
        entry.location = non_empty(edit.location.as_deref());

        Ok(entry)
    }

    /// Removes and returns the entry at `index`.
    ///
    /// Later entries shift down by one position.
    pub fn remove(&mut self, index: usize) -> CoreResult<CountEntry> {
        if index >= self.entries.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        Ok(self.entries.remove(index))
    }

    /// Removes every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Projects the ledger into export rows, in order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.entries.iter().map(CountEntry::to_row).collect()
    }

    pub fn entries(&self) -> &[CountEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CountEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    const NOW: i64 = 1_700_000_000_000;

    fn strict() -> Preferences {
        Preferences {
            strict: true,
            ..Preferences::default()
        }
    }

    #[test]
    fn test_append_assigns_timestamp_and_trims() {
        let mut ledger = Ledger::new();
        let entry = ledger
            .append(
                EntryDraft::new("  4006381333931 ", 3)
                    .description(" Pens ")
                    .location(""),
                &Preferences::default(),
                NOW,
            )
            .unwrap()
            .clone();

        assert_eq!(entry.timestamp, NOW);
        assert_eq!(entry.barcode, "4006381333931");
        assert_eq!(entry.description.as_deref(), Some("Pens"));
        assert_eq!(entry.location, None);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_append_rejects_without_state_change() {
        let mut ledger = Ledger::new();

        let err = ledger
            .append(EntryDraft::new("", 1), &Preferences::default(), NOW)
            .unwrap_err();
        assert_eq!(err, CoreError::Validation(ValidationError::required("barcode")));

        let err = ledger
            .append(EntryDraft::new("A", -1), &Preferences::default(), NOW)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidQuantity { .. })
        ));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_append_strict_mode() {
        let mut ledger = Ledger::new();

        assert!(ledger
            .append(EntryDraft::new("4006381333932", 1), &strict(), NOW)
            .is_err());
        assert!(ledger
            .append(EntryDraft::new("QR:abc", 1), &strict(), NOW)
            .is_err());
        assert!(ledger
            .append(EntryDraft::new("QR:abc", 1), &Preferences::default(), NOW)
            .is_ok());
        assert!(ledger
            .append(EntryDraft::new("4006381333931", 1), &strict(), NOW)
            .is_ok());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_append_uses_default_location() {
        let prefs = Preferences {
            default_location: "Aisle 4".to_string(),
            ..Preferences::default()
        };
        let mut ledger = Ledger::new();
        ledger.append(EntryDraft::new("A", 1), &prefs, NOW).unwrap();
        ledger
            .append(EntryDraft::new("B", 1).location("Back room"), &prefs, NOW)
            .unwrap();

        assert_eq!(ledger.entries()[0].location.as_deref(), Some("Aisle 4"));
        assert_eq!(ledger.entries()[1].location.as_deref(), Some("Back room"));
    }

    #[test]
    fn test_update_preserves_timestamp_and_barcode() {
        let mut ledger = Ledger::new();
        ledger
            .append(EntryDraft::new("A", 1).location("Shelf 1"), &Preferences::default(), NOW)
            .unwrap();

        let edit = EntryEdit {
            quantity: 9,
            description: Some("Glue".into()),
            location: None,
        };
        let updated = ledger.update(0, edit).unwrap().clone();

        assert_eq!(updated.timestamp, NOW);
        assert_eq!(updated.barcode, "A");
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.description.as_deref(), Some("Glue"));
        assert_eq!(updated.location, None);
    }

    #[test]
    fn test_update_out_of_range_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        ledger
            .append(EntryDraft::new("A", 1), &Preferences::default(), NOW)
            .unwrap();
        let before = ledger.clone();

        let err = ledger.update(5, EntryEdit::default()).unwrap_err();
        assert_eq!(err, CoreError::IndexOutOfRange { index: 5, len: 1 });

        let err = ledger
            .update(
                0,
                EntryEdit {
                    quantity: -2,
                    ..EntryEdit::default()
                },
            )
            .unwrap_err();
        assert!(err.is_input_error());

        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut ledger = Ledger::new();
        for code in ["A", "B", "C"] {
            ledger
                .append(EntryDraft::new(code, 1), &Preferences::default(), NOW)
                .unwrap();
        }

        let removed = ledger.remove(1).unwrap();
        assert_eq!(removed.barcode, "B");
        assert_eq!(ledger.get(1).map(|e| e.barcode.as_str()), Some("C"));
        assert_eq!(
            ledger.remove(2),
            Err(CoreError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_clear_is_repeatable() {
        let mut ledger = Ledger::new();
        ledger
            .append(EntryDraft::new("A", 1), &Preferences::default(), NOW)
            .unwrap();

        assert_eq!(ledger.clear(), 1);
        assert!(ledger.is_empty());
        assert_eq!(ledger.clear(), 0);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut ledger = Ledger::new();
        ledger
            .append(EntryDraft::new("A", 2), &Preferences::default(), NOW)
            .unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"[{"ts":1700000000000,"barcode":"A","qty":2}]"#);

        let restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
