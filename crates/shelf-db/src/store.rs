//! # State Store
//!
//! The seam between the write-through services and wherever records live.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   InventoryLedger          PreferencesStore                            │
//! │         │                        │                                      │
//! │         └──────────┬─────────────┘                                      │
//! │                    ▼                                                    │
//! │          Arc<dyn StateStore>   load(key) / save(key, json)             │
//! │                    │                                                    │
//! │         ┌──────────┴──────────┐                                         │
//! │         ▼                     ▼                                         │
//! │   StateRepository        MemoryStore                                   │
//! │   (SQLite app_state)     (HashMap, tests and dry runs)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is constructed once at startup and shared for the life of the
//! process.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::trace;

use crate::error::{DbError, DbResult};

/// Key/value storage for whole JSON records.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the raw record stored under `key`, if any.
    async fn load(&self, key: &str) -> DbResult<Option<String>>;

    /// Replaces the record stored under `key`.
    async fn save(&self, key: &str, value: &str) -> DbResult<()>;
}

/// Loads and parses a record.
///
/// A missing record is `Ok(None)`. A record that does not parse is
/// [`DbError::CorruptRecord`].
pub async fn load_record<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> DbResult<Option<T>> {
    match store.load(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DbError::corrupt(key, e)),
        None => Ok(None),
    }
}

/// Serializes and saves a record.
pub async fn save_record<T: Serialize + ?Sized>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
) -> DbResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| DbError::Serialization(e.to_string()))?;
    store.save(key, &raw).await
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates a store pre-filled with raw records.
    pub fn with_records<K, V>(records: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        MemoryStore {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> DbResult<()> {
        trace!(key = %key, bytes = value.len(), "Saving record in memory");
        self.records
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::Preferences;

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let store = MemoryStore::new();
        let prefs: Option<Preferences> = load_record(&store, "nope").await.unwrap();
        assert!(prefs.is_none());
    }

    #[tokio::test]
    async fn test_record_round_trip() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            default_location: "Aisle 9".into(),
            strict: true,
            sink_url: String::new(),
        };

        save_record(&store, "prefs", &prefs).await.unwrap();
        let raw = store.load("prefs").await.unwrap().unwrap();
        assert!(raw.contains("\"defaultLoc\":\"Aisle 9\""));

        let loaded: Option<Preferences> = load_record(&store, "prefs").await.unwrap();
        assert_eq!(loaded, Some(prefs));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let store = MemoryStore::with_records([("prefs", "{not json")]);
        let err = load_record::<Preferences>(&store, "prefs").await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { ref key, .. } if key == "prefs"));
    }
}
