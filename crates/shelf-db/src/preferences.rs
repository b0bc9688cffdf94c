//! # Preferences Store
//!
//! Operator preferences (default location, strict flag, sink URL). Loaded
//! once at startup and saved immediately after each change; there is no
//! batching.

use std::sync::Arc;

use shelf_core::{Preferences, PREFS_STORAGE_KEY};
use tracing::info;

use crate::error::DbResult;
use crate::store::{load_record, save_record, StateStore};

/// Persisted operator preferences.
pub struct PreferencesStore {
    store: Arc<dyn StateStore>,
    prefs: Preferences,
}

impl PreferencesStore {
    /// Restores preferences, or defaults if none are saved.
    pub async fn load(store: Arc<dyn StateStore>) -> DbResult<Self> {
        let prefs: Preferences = load_record(store.as_ref(), PREFS_STORAGE_KEY)
            .await?
            .unwrap_or_default();

        info!(strict = prefs.strict, "Preferences restored");

        Ok(PreferencesStore { store, prefs })
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub async fn set_default_location(&mut self, location: &str) -> DbResult<()> {
        let location = location.trim().to_string();
        self.update(|prefs| prefs.default_location = location).await
    }

    pub async fn set_strict(&mut self, strict: bool) -> DbResult<()> {
        self.update(|prefs| prefs.strict = strict).await
    }

    pub async fn set_sink_url(&mut self, url: &str) -> DbResult<()> {
        let url = url.trim().to_string();
        self.update(|prefs| prefs.sink_url = url).await
    }

    async fn update(&mut self, change: impl FnOnce(&mut Preferences)) -> DbResult<()> {
        let mut next = self.prefs.clone();
        change(&mut next);

        save_record(self.store.as_ref(), PREFS_STORAGE_KEY, &next).await?;
        self.prefs = next;

        info!(
            default_location = %self.prefs.default_location,
            strict = self.prefs.strict,
            "Preferences saved"
        );
        Ok(())
    }
}
