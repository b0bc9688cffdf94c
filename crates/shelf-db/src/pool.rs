//! # Database Handle
//!
//! Opens the SQLite file that holds the ledger and preferences records.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)            [storage] database_path                │
//! │    └─► Database::new(config)    open pool, apply migrations            │
//! │          └─► db.state()         StateRepository (a StateStore)         │
//! │                ├─► InventoryLedger::load(store)                        │
//! │                └─► PreferencesStore::load(store)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrent Invocations
//! A `scan` may run in one terminal while `list` or `export` runs in
//! another. File databases use WAL journaling so readers never block the
//! writer, and a busy timeout so two writers wait for each other instead of
//! failing with `SQLITE_BUSY`. NORMAL synchronous mode can lose the last
//! write on power loss, never an earlier one.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::state::StateRepository;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A file, created on first open. Its directory must exist.
    File(PathBuf),
    /// A private in-process database, gone when the handle is dropped.
    Memory,
}

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/shelf-counter/shelf-counter.db")
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// How long a write waits for another process holding the lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Connections in the pool. Default: 2 (one command plus one reader)
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            busy_timeout: Duration::from_secs(5),
            max_connections: 2,
        }
    }

    /// In-memory database for tests.
    ///
    /// Each connection to an in-memory database sees its own empty
    /// database, so the pool holds exactly one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            busy_timeout: Duration::from_secs(1),
            max_connections: 1,
        }
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new().busy_timeout(self.busy_timeout);

        match &self.location {
            DbLocation::Memory => options.in_memory(true),
            DbLocation::File(path) => options
                .filename(path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true),
        }
    }

    fn max_connections_for_location(&self) -> u32 {
        match self.location {
            DbLocation::Memory => 1,
            DbLocation::File(_) => self.max_connections,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open database with its schema up to date.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening database");

        // In-memory connections must never be recycled: a new connection
        // would be a new, empty database.
        let lifetime = match config.location {
            DbLocation::Memory => None,
            DbLocation::File(_) => Some(Duration::from_secs(600)),
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections_for_location())
            .idle_timeout(lifetime)
            .max_lifetime(lifetime)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        debug!(busy_timeout_ms = config.busy_timeout.as_millis() as u64, "Database ready");

        Ok(Database { pool })
    }

    /// Returns the key/value state repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let store: Arc<dyn StateStore> = Arc::new(db.state());
    /// let ledger = InventoryLedger::load(store).await?;
    /// ```
    pub fn state(&self) -> StateRepository {
        StateRepository::new(self.pool.clone())
    }

    /// Versions of the migrations applied to this database, ascending.
    pub async fn schema_versions(&self) -> DbResult<Vec<i64>> {
        migrations::applied_versions(&self.pool).await
    }

    /// Waits for in-flight writes and closes every connection.
    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }
}
