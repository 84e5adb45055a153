use super::batch::{BatchRunReport, DEFAULT_THROTTLE, run_batched};
use crate::error::{MaintenanceError, ValidationError};
use crate::store::traits::BatchMover;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;

const SECONDS_PER_DAY: i64 = 86_400;

/// Epoch-second cutoff `days` before `now`.
pub fn cutoff_from_days(days: u32, now: i64) -> Result<i64, ValidationError> {
    if days == 0 {
        return Err(ValidationError::ZeroDays);
    }
    Ok(now.saturating_sub(i64::from(days) * SECONDS_PER_DAY))
}

pub(crate) fn validate_run(cutoff: i64, batch_size: usize) -> Result<(), ValidationError> {
    if batch_size == 0 {
        return Err(ValidationError::ZeroBatchSize);
    }
    if cutoff < 0 {
        return Err(ValidationError::NegativeCutoff(cutoff));
    }
    Ok(())
}

/// Moves aging records from the hot to the cold tier in bounded batches.
pub struct ArchiveMigrator<M> {
    mover: M,
    throttle: Duration,
}

impl<M: BatchMover> ArchiveMigrator<M> {
    pub fn new(mover: M) -> Self {
        Self {
            mover,
            throttle: DEFAULT_THROTTLE,
        }
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Archive every hot record with `created_at < cutoff`.
    ///
    /// On a storage failure the error carries the count committed before it;
    /// calling again with the same cutoff picks up where the run stopped.
    pub async fn migrate(
        &self,
        cutoff: i64,
        batch_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BatchRunReport, MaintenanceError> {
        validate_run(cutoff, batch_size)?;
        tracing::info!(cutoff, batch_size, "archiving conversations");

        let mover = &self.mover;
        run_batched("archive", batch_size, self.throttle, shutdown, move |limit| {
            mover.move_batch(cutoff, limit, Utc::now().timestamp())
        })
        .await
    }

    /// Archive records older than `days` days.
    pub async fn migrate_older_than(
        &self,
        days: u32,
        batch_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BatchRunReport, MaintenanceError> {
        let cutoff = cutoff_from_days(days, Utc::now().timestamp())?;
        self.migrate(cutoff, batch_size, shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::batch::never_cancelled;
    use crate::store::SqliteStore;
    use crate::store::filters::QueryFilters;
    use crate::store::traits::{ColdTier, HotTier};
    use crate::store::types::NewConversation;

    #[test]
    fn cutoff_counts_whole_days() {
        assert_eq!(cutoff_from_days(1, 100_000).unwrap(), 100_000 - 86_400);
        assert_eq!(cutoff_from_days(0, 100_000), Err(ValidationError::ZeroDays));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() {
        let store = SqliteStore::in_memory().await.unwrap();
        let migrator = ArchiveMigrator::new(store);
        let err = migrator.migrate(10, 0, never_cancelled()).await.unwrap_err();
        assert!(matches!(
            err,
            MaintenanceError::Validation(ValidationError::ZeroBatchSize)
        ));
        let err = migrator.migrate(-1, 10, never_cancelled()).await.unwrap_err();
        assert!(matches!(
            err,
            MaintenanceError::Validation(ValidationError::NegativeCutoff(-1))
        ));
    }

    #[tokio::test]
    async fn recent_records_stay_hot() {
        let store = SqliteStore::in_memory().await.unwrap();
        let now = Utc::now().timestamp();
        for age_days in [40, 35, 1, 0] {
            store
                .hot()
                .insert(NewConversation {
                    created_at: now - age_days * SECONDS_PER_DAY,
                    ..NewConversation::default()
                })
                .await
                .unwrap();
        }

        let migrator = ArchiveMigrator::new(store.clone()).with_throttle(Duration::ZERO);
        let report = migrator
            .migrate_older_than(30, 10, never_cancelled())
            .await
            .unwrap();
        assert_eq!(report.processed, 2);

        let all = QueryFilters::new();
        assert_eq!(store.hot().count(&all).await.unwrap(), 2);
        assert_eq!(store.cold().count(&all).await.unwrap(), 2);
    }
}
