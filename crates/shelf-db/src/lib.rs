//! # shelf-db: Persistence Layer for Shelf Counter
//!
//! Stores the ledger and the operator preferences in SQLite, and rewrites
//! each record in full after every mutation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shelf Counter Data Flow                            │
//! │                                                                         │
//! │  counter command (add / edit / remove / clear / prefs set)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shelf-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ InventoryLedger│   │PreferencesStore│   │  Migrations  │   │   │
//! │  │   │ (inventory.rs) │   │(preferences.rs)│   │  (embedded)  │   │   │
//! │  │   └───────┬────────┘   └───────┬────────┘   └──────────────┘   │   │
//! │  │           └─────────┬──────────┘                               │   │
//! │  │                     ▼                                          │   │
//! │  │            Arc<dyn StateStore>  (store.rs)                     │   │
//! │  │                     │                                          │   │
//! │  │           StateRepository → SqlitePool (pool.rs)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shelf_db::{Database, DbConfig, InventoryLedger, PreferencesStore, StateStore};
//!
//! let db = Database::new(DbConfig::new("./shelf-counter.db")).await?;
//! let store: Arc<dyn StateStore> = Arc::new(db.state());
//!
//! let prefs = PreferencesStore::load(store.clone()).await?;
//! let mut ledger = InventoryLedger::load(store).await?;
//! ledger.append(EntryDraft::new("4006381333931", 3), prefs.get()).await?;
//! ```

pub mod error;
pub mod inventory;
mod migrations;
pub mod pool;
pub mod preferences;
pub mod repository;
pub mod store;

pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use inventory::InventoryLedger;
pub use pool::{Database, DbConfig, DbLocation};
pub use preferences::PreferencesStore;
pub use repository::state::{StateRecord, StateRepository};
pub use store::{MemoryStore, StateStore};
