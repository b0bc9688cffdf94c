//! # Inventory Ledger (write-through)
//!
//! Wraps the in-memory [`Ledger`] and saves the full ledger after every
//! successful mutation.
//!
//! ## Mutation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append / update / remove / clear                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Clone current ledger                                               │
//! │  2. Apply the operation to the clone ──── rejected? → StoreError::Rejected
//! │  3. Save the clone                  ──── failed?   → StoreError::Persist │
//! │  4. Clone becomes the current ledger                                   │
//! │                                                                         │
//! │  Memory and storage never disagree after a call returns.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use shelf_core::{
    CountEntry, EntryDraft, EntryEdit, ExportRow, Ledger, Preferences, LEDGER_STORAGE_KEY,
};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::store::{load_record, save_record, StateStore};

/// Persisted, ordered list of count entries.
pub struct InventoryLedger {
    store: Arc<dyn StateStore>,
    ledger: Ledger,
}

impl InventoryLedger {
    /// Restores the ledger from the store, or starts empty if none is saved.
    pub async fn load(store: Arc<dyn StateStore>) -> StoreResult<Self> {
        let ledger: Ledger = load_record(store.as_ref(), LEDGER_STORAGE_KEY)
            .await?
            .unwrap_or_default();

        info!(entries = ledger.len(), "Ledger restored");

        Ok(InventoryLedger { store, ledger })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates and appends a new entry stamped with the current time.
    pub async fn append(
        &mut self,
        draft: EntryDraft,
        prefs: &Preferences,
    ) -> StoreResult<CountEntry> {
        self.append_at(draft, prefs, Utc::now().timestamp_millis())
            .await
    }

    /// Validates and appends a new entry stamped with `now_ms`.
    pub async fn append_at(
        &mut self,
        draft: EntryDraft,
        prefs: &Preferences,
        now_ms: i64,
    ) -> StoreResult<CountEntry> {
        let mut next = self.ledger.clone();
        let entry = next.append(draft, prefs, now_ms)?.clone();

        self.commit(next).await?;

        info!(
            barcode = %entry.barcode,
            qty = entry.quantity,
            position = self.ledger.len() - 1,
            "Entry appended"
        );
        Ok(entry)
    }

    /// Replaces quantity, description and location of the entry at `index`.
    pub async fn update(&mut self, index: usize, edit: EntryEdit) -> StoreResult<CountEntry> {
        let mut next = self.ledger.clone();
        let entry = next.update(index, edit)?.clone();

        self.commit(next).await?;

        info!(index, qty = entry.quantity, "Entry updated");
        Ok(entry)
    }

    /// Removes the entry at `index`; later entries shift down.
    pub async fn remove(&mut self, index: usize) -> StoreResult<CountEntry> {
        let mut next = self.ledger.clone();
        let removed = next.remove(index)?;

        self.commit(next).await?;

        info!(index, barcode = %removed.barcode, "Entry removed");
        Ok(removed)
    }

    /// Empties the ledger. Returns how many entries were removed.
    ///
    /// Clearing an empty ledger writes nothing.
    pub async fn clear(&mut self) -> StoreResult<usize> {
        if self.ledger.is_empty() {
            debug!("Clear on empty ledger");
            return Ok(0);
        }

        let mut next = self.ledger.clone();
        let removed = next.clear();

        self.commit(next).await?;

        info!(count = removed, "Ledger cleared");
        Ok(removed)
    }

    async fn commit(&mut self, next: Ledger) -> StoreResult<()> {
        save_record(self.store.as_ref(), LEDGER_STORAGE_KEY, &next).await?;
        self.ledger = next;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Read-only projection for encoders and the remote sink.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.ledger.export_rows()
    }

    pub fn entries(&self) -> &[CountEntry] {
        self.ledger.entries()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DbError, DbResult, StoreError};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use shelf_core::CoreError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose saves can be switched to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail: AtomicBool,
    }

    #[async_trait]
    impl StateStore for FlakyStore {
        async fn load(&self, key: &str) -> DbResult<Option<String>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, value: &str) -> DbResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("disk I/O error".into()));
            }
            self.inner.save(key, value).await
        }
    }

    fn prefs() -> Preferences {
        Preferences::default()
    }

    #[tokio::test]
    async fn test_append_is_written_through() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = InventoryLedger::load(store.clone()).await.unwrap();

        ledger
            .append_at(EntryDraft::new("A", 2), &prefs(), 42)
            .await
            .unwrap();

        let raw = store.load(LEDGER_STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"ts":42,"barcode":"A","qty":2}]"#);

        let reloaded = InventoryLedger::load(store).await.unwrap();
        assert_eq!(reloaded.entries(), ledger.entries());
    }

    #[tokio::test]
    async fn test_rejected_operation_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = InventoryLedger::load(store.clone()).await.unwrap();

        let err = ledger
            .append(EntryDraft::new("A", -1), &prefs())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::Validation(_))));

        let err = ledger.remove(0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(CoreError::IndexOutOfRange { index: 0, len: 0 })
        ));

        assert!(store.load(LEDGER_STORAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let store = Arc::new(FlakyStore::default());
        let mut ledger = InventoryLedger::load(store.clone()).await.unwrap();
        ledger
            .append_at(EntryDraft::new("A", 1), &prefs(), 1)
            .await
            .unwrap();

        store.fail.store(true, Ordering::SeqCst);

        let err = ledger
            .append_at(EntryDraft::new("B", 1), &prefs(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persist(_)));
        assert!(ledger.clear().await.is_err());

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].barcode, "A");
    }

    #[tokio::test]
    async fn test_update_and_remove_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = InventoryLedger::load(store.clone()).await.unwrap();
        for (i, code) in ["A", "B"].into_iter().enumerate() {
            ledger
                .append_at(EntryDraft::new(code, 1), &prefs(), i as i64)
                .await
                .unwrap();
        }

        ledger
            .update(
                1,
                EntryEdit {
                    quantity: 5,
                    description: Some("Tape".into()),
                    location: None,
                },
            )
            .await
            .unwrap();
        ledger.remove(0).await.unwrap();

        let reloaded = InventoryLedger::load(store).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.entries()[0].barcode, "B");
        assert_eq!(reloaded.entries()[0].quantity, 5);
        assert_eq!(reloaded.entries()[0].timestamp, 1);
    }

    #[tokio::test]
    async fn test_clear_twice() {
        let store = Arc::new(MemoryStore::new());
        let mut ledger = InventoryLedger::load(store.clone()).await.unwrap();
        ledger.append(EntryDraft::new("A", 1), &prefs()).await.unwrap();

        assert_eq!(ledger.clear().await.unwrap(), 1);
        assert_eq!(ledger.clear().await.unwrap(), 0);
        assert!(InventoryLedger::load(store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_ledger_fails_to_load() {
        let store = Arc::new(MemoryStore::with_records([(LEDGER_STORAGE_KEY, "{}")]));
        let result = InventoryLedger::load(store).await;
        assert!(matches!(
            result,
            Err(StoreError::Persist(DbError::CorruptRecord { .. }))
        ));
    }
}
