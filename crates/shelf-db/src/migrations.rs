//! Schema migrations, embedded at build time from `migrations/sqlite/`.
//!
//! The schema is one key/value table. Changing the shape of a stored
//! record does not need a migration: bump the storage key version in
//! `shelf-core` instead. Files are named `NNN_description.sql` and are
//! never edited once released.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded. Runs on each open.
pub(crate) async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    debug!(known = MIGRATOR.iter().count(), "Schema up to date");
    Ok(())
}

/// Versions recorded in sqlx's bookkeeping table, ascending.
pub(crate) async fn applied_versions(pool: &SqlitePool) -> DbResult<Vec<i64>> {
    let versions =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version")
            .fetch_all(pool)
            .await?;
    Ok(versions)
}
