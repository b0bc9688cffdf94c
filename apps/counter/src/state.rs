//! # Application State
//!
//! Everything a command needs, opened once per invocation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState                                                               │
//! │  ├── config       CounterConfig (static settings)                      │
//! │  ├── db           Database (pool + migrations)                         │
//! │  ├── ledger       InventoryLedger ──┐                                  │
//! │  └── prefs        PreferencesStore ─┴─► StateRepository (app_state)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use shelf_db::{Database, DbConfig, InventoryLedger, PreferencesStore, StateStore};
use tracing::info;

use crate::config::CounterConfig;
use crate::error::AppResult;

pub struct AppState {
    pub config: CounterConfig,
    pub db: Database,
    pub ledger: InventoryLedger,
    pub prefs: PreferencesStore,
}

impl AppState {
    /// Opens the configured database file, creating its directory if needed.
    pub async fn open(config: CounterConfig) -> AppResult<Self> {
        let path = config.database_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(?path, "Database path determined");

        let db = Database::new(DbConfig::new(path)).await?;
        Self::with_database(config, db).await
    }

    /// Restores the ledger and preferences from an already opened database.
    pub async fn with_database(config: CounterConfig, db: Database) -> AppResult<Self> {
        let store: Arc<dyn StateStore> = Arc::new(db.state());

        let ledger = InventoryLedger::load(store.clone()).await?;
        let prefs = PreferencesStore::load(store).await?;

        Ok(AppState {
            config,
            db,
            ledger,
            prefs,
        })
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}
