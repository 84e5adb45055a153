use super::rows::archived_from_row;
use super::schema::{ARCHIVE_COLUMNS, COLD_TABLE};
use super::sql::{self, push_filters, push_page, row_count, sql_count};
use crate::store::filters::QueryFilters;
use crate::store::traits::{ColdTier, StoreFuture};
use crate::store::types::{ArchivedRecord, PageKey};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Cold tier view over a `SqliteStore` database.
#[derive(Debug, Clone)]
pub struct SqliteColdTier {
    pool: SqlitePool,
}

impl SqliteColdTier {
    pub(super) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ColdTier for SqliteColdTier {
    fn name(&self) -> &str {
        "sqlite-cold"
    }

    fn insert_batch<'a>(&'a self, records: &'a [ArchivedRecord]) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            if records.is_empty() {
                return Ok(0);
            }
            let mut tx = self.pool.begin().await?;
            let inserted = sql::insert_archived(&mut tx, records).await?;
            tx.commit().await?;
            Ok(inserted)
        })
    }

    fn existing_ids<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<i64>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let mut conn = self.pool.acquire().await?;
            Ok(sql::select_present_ids(&mut conn, COLD_TABLE, ids).await?)
        })
    }

    fn purge_batch(&self, cutoff: i64, limit: usize) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query(&format!(
                "DELETE FROM {COLD_TABLE} WHERE id IN (
                     SELECT id FROM {COLD_TABLE}
                     WHERE created_at < ?1
                     ORDER BY id ASC
                     LIMIT ?2
                 )"
            ))
            .bind(cutoff)
            .bind(sql_count(limit))
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected())
        })
    }

    fn count<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let mut builder =
                QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {COLD_TABLE}"));
            push_filters(&mut builder, filters);
            let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
            Ok(row_count(count))
        })
    }

    fn select_page<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ArchivedRecord>> {
        Box::pin(async move {
            let mut builder =
                QueryBuilder::<Sqlite>::new(format!("SELECT {ARCHIVE_COLUMNS} FROM {COLD_TABLE}"));
            push_filters(&mut builder, filters);
            push_page(&mut builder, offset, limit);
            let rows = builder.build().fetch_all(&self.pool).await?;
            Ok(rows
                .iter()
                .map(archived_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn select_page_keys<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<PageKey>> {
        Box::pin(async move {
            let mut conn = self.pool.acquire().await?;
            Ok(sql::select_page_keys(&mut conn, COLD_TABLE, filters, offset, limit).await?)
        })
    }

    fn get_many<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<ArchivedRecord>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let mut conn = self.pool.acquire().await?;
            let rows = sql::select_rows_by_ids(&mut conn, COLD_TABLE, ARCHIVE_COLUMNS, ids).await?;
            Ok(rows
                .iter()
                .map(archived_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
    }
}
