//! Database initialization
//!
//! Opens (or creates) the service database and runs the migration ledger
//! before anything else can touch it.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Pool size; SQLite still admits a single writer at a time
const MAX_CONNECTIONS: u32 = 10;

/// How long a writer waits for the lock before failing with SQLITE_BUSY
///
/// Concurrent review submissions all write to `ratings`.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database at `db_path` and bring its schema up to date
///
/// A migration failure is returned to the caller and must abort startup.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(db_path)
                .busy_timeout(BUSY_TIMEOUT)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true),
        )
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    crate::db::migrations::apply_all(&pool).await?;
    info!("Database schema ready");

    Ok(pool)
}
