use super::SqliteStore;
use super::schema::{COLD_TABLE, COMPRESSED_TABLE, HOT_TABLE};
use super::sql::row_count;
use crate::error::StorageError;
use crate::store::types::{OptimizeReport, StorageStats};

impl SqliteStore {
    /// Row counts, hot-tier age range and per-table sizes.
    pub async fn stats(&self) -> Result<StorageStats, StorageError> {
        let hot_count = self.table_count(HOT_TABLE).await?;
        let cold_count = self.table_count(COLD_TABLE).await?;
        let compressed_count = self.table_count(COMPRESSED_TABLE).await?;

        let (oldest, newest): (Option<i64>, Option<i64>) = sqlx::query_as(&format!(
            "SELECT MIN(created_at), MAX(created_at) FROM {HOT_TABLE}"
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(StorageStats {
            hot_count,
            cold_count,
            compressed_count,
            oldest_hot_created_at: oldest,
            newest_hot_created_at: newest,
            hot_bytes: self.table_bytes(HOT_TABLE).await,
            cold_bytes: self.table_bytes(COLD_TABLE).await,
        })
    }

    /// Rebuild planner statistics and reclaim free pages.
    pub async fn optimize(&self) -> Result<OptimizeReport, StorageError> {
        let pages_before = self.page_count().await?;
        sqlx::query("ANALYZE").execute(&self.pool).await?;
        sqlx::query("VACUUM").execute(&self.pool).await?;
        let pages_after = self.page_count().await?;

        tracing::info!(pages_before, pages_after, "optimized conversation store");
        Ok(OptimizeReport {
            pages_before,
            pages_after,
        })
    }

    async fn table_count(&self, table: &str) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(row_count(count))
    }

    async fn page_count(&self) -> Result<u64, StorageError> {
        let pages: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;
        Ok(row_count(pages))
    }

    /// Table plus index bytes from the `dbstat` virtual table. `None` when the
    /// linked SQLite was built without it.
    async fn table_bytes(&self, table: &str) -> Option<u64> {
        let result: Result<Option<i64>, sqlx::Error> = sqlx::query_scalar(
            "SELECT SUM(pgsize) FROM dbstat
             WHERE name = ?1
                OR name IN (SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1)",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(bytes) => Some(bytes.map_or(0, row_count)),
            Err(error) => {
                tracing::debug!(table, %error, "table size unavailable");
                None
            }
        }
    }
}
