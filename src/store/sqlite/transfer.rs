use super::SqliteStore;
use super::hot::select_aging;
use super::schema::HOT_TABLE;
use super::sql;
use crate::store::traits::{BatchMover, StoreFuture};
use crate::store::types::{ArchivedRecord, BatchOutcome};
use uuid::Uuid;

impl BatchMover for SqliteStore {
    /// Select, archive and delete one batch inside a single transaction.
    /// Dropping the transaction on any error rolls every step back.
    fn move_batch(
        &self,
        cutoff: i64,
        limit: usize,
        archived_at: i64,
    ) -> StoreFuture<'_, BatchOutcome> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            let records = select_aging(&mut *tx, cutoff, limit).await?;
            if records.is_empty() {
                return Ok(BatchOutcome::default());
            }

            let selected = records.len();
            let batch_token = Uuid::new_v4().to_string();
            let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
            let archived: Vec<ArchivedRecord> = records
                .into_iter()
                .map(|record| ArchivedRecord::from_hot(record, archived_at, &batch_token))
                .collect();

            let inserted = sql::insert_archived(&mut tx, &archived).await?;
            let moved = sql::delete_ids(&mut tx, HOT_TABLE, &ids).await?;
            tx.commit().await?;

            tracing::debug!(
                batch_token = %batch_token,
                selected,
                inserted,
                moved,
                "archived batch"
            );
            Ok(BatchOutcome {
                selected: u64::try_from(selected).unwrap_or(u64::MAX),
                moved,
            })
        })
    }
}
