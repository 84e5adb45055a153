use crate::error::StorageError;
use crate::store::traits::{BatchMover, ColdTier, HotTier, StoreFuture};
use crate::store::types::{ArchivedRecord, BatchOutcome};
use uuid::Uuid;

/// Batch mover for hot and cold tiers that cannot share a transaction.
///
/// Each batch is written to the cold tier under a fresh batch token, confirmed
/// by identity, and only then deleted from the hot tier. A crash between the
/// cold commit and the hot delete leaves the rows in both tiers until the
/// next run re-selects them: the cold insert skips identities it already
/// holds and the hot delete finishes the move.
pub struct TwoPhaseMover<H, C> {
    hot: H,
    cold: C,
}

impl<H: HotTier, C: ColdTier> TwoPhaseMover<H, C> {
    pub fn new(hot: H, cold: C) -> Self {
        Self { hot, cold }
    }
}

impl<H: HotTier, C: ColdTier> BatchMover for TwoPhaseMover<H, C> {
    fn move_batch(
        &self,
        cutoff: i64,
        limit: usize,
        archived_at: i64,
    ) -> StoreFuture<'_, BatchOutcome> {
        Box::pin(async move {
            let records = self.hot.select_aging(cutoff, limit).await?;
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

            let inserted = self.cold.insert_batch(&archived).await?;
            let confirmed = self.cold.existing_ids(&ids).await?;
            if confirmed.len() != ids.len() {
                tracing::warn!(
                    batch_token = %batch_token,
                    expected = ids.len(),
                    confirmed = confirmed.len(),
                    "cold tier did not confirm batch, keeping hot rows"
                );
                return Err(StorageError::Confirmation {
                    expected: ids.len(),
                    confirmed: confirmed.len(),
                });
            }

            let moved = self.hot.delete_by_ids(&ids).await?;
            tracing::debug!(
                hot = self.hot.name(),
                cold = self.cold.name(),
                batch_token = %batch_token,
                selected,
                inserted,
                moved,
                "archived batch in two phases"
            );
            Ok(BatchOutcome {
                selected: u64::try_from(selected).unwrap_or(u64::MAX),
                moved,
            })
        })
    }
}
