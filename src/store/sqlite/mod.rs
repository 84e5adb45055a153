mod cold;
mod compressed;
mod hot;
mod rows;
mod schema;
mod sql;
mod stats;
mod transfer;

pub use cold::SqliteColdTier;
pub use hot::SqliteHotTier;

use crate::error::StorageError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// SQLite-backed tier storage.
///
/// Hot, cold and compressed tables share one database, so a migration batch
/// commits or rolls back as a single transaction.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub async fn open(path: &Path, busy_timeout: Duration) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        schema::init_schema(&pool).await?;
        tracing::debug!(path = %path.display(), "opened conversation store");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Every in-memory connection is a separate database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        schema::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn hot(&self) -> SqliteHotTier {
        SqliteHotTier::new(self.pool.clone())
    }

    pub fn cold(&self) -> SqliteColdTier {
        SqliteColdTier::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
