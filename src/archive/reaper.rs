use super::batch::{BatchRunReport, DEFAULT_THROTTLE, run_batched};
use super::migrator::{cutoff_from_days, validate_run};
use crate::error::{MaintenanceError, StorageError};
use crate::store::traits::ColdTier;
use crate::store::types::BatchOutcome;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;

/// Deletes expired cold-tier records in bounded batches. Irreversible.
pub struct RetentionReaper<C> {
    cold: C,
    throttle: Duration,
}

impl<C: ColdTier> RetentionReaper<C> {
    pub fn new(cold: C) -> Self {
        Self {
            cold,
            throttle: DEFAULT_THROTTLE,
        }
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Delete every archived record with `created_at < cutoff`.
    pub async fn purge(
        &self,
        cutoff: i64,
        batch_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BatchRunReport, MaintenanceError> {
        validate_run(cutoff, batch_size)?;
        tracing::info!(cutoff, batch_size, tier = self.cold.name(), "purging archive");

        let cold = &self.cold;
        run_batched("purge", batch_size, self.throttle, shutdown, move |limit| async move {
            let deleted = cold.purge_batch(cutoff, limit).await?;
            Ok::<_, StorageError>(BatchOutcome {
                selected: deleted,
                moved: deleted,
            })
        })
        .await
    }

    /// Purge archived records older than `days` days.
    pub async fn purge_older_than(
        &self,
        days: u32,
        batch_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BatchRunReport, MaintenanceError> {
        let cutoff = cutoff_from_days(days, Utc::now().timestamp())?;
        self.purge(cutoff, batch_size, shutdown).await
    }
}
