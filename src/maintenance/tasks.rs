use crate::archive::{ArchiveMigrator, BatchRunReport, RetentionReaper};
use crate::config::Config;
use crate::error::TierlogError;
use crate::store::SqliteStore;
use crate::store::types::{OptimizeReport, StorageStats};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

/// The periodic jobs run against the conversation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTask {
    /// Move aged hot records into the archive.
    ///
    /// Rows in the compressed table are never archived.
    Archive,
    /// Purge expired archive records.
    ///
    /// Rows in the compressed table sit outside retention and are never
    /// purged; that table only grows.
    Cleanup,
    /// Reclaim space and refresh planner statistics.
    Optimize,
    /// Log table sizes and warn on an oversized hot tier.
    Stats,
}

impl MaintenanceTask {
    pub const ALL: [Self; 4] = [Self::Archive, Self::Cleanup, Self::Optimize, Self::Stats];

    pub fn name(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Cleanup => "cleanup",
            Self::Optimize => "optimize",
            Self::Stats => "stats",
        }
    }

    pub fn initial_delay(self, config: &Config) -> Duration {
        match self {
            Self::Archive => config.archive.initial_delay(),
            Self::Cleanup => config.retention.initial_delay(),
            Self::Optimize => config.optimize.initial_delay(),
            Self::Stats => config.stats.initial_delay(),
        }
    }

    pub fn interval(self, config: &Config) -> Duration {
        match self {
            Self::Archive => config.archive.interval(),
            Self::Cleanup => config.retention.interval(),
            Self::Optimize => config.optimize.interval(),
            Self::Stats => config.stats.interval(),
        }
    }
}

impl fmt::Display for MaintenanceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskOutcome {
    Archived(BatchRunReport),
    Purged(BatchRunReport),
    Optimized(OptimizeReport),
    Stats(StorageStats),
}

/// Run `task` once with the settings in `config`.
pub async fn run_task(
    task: MaintenanceTask,
    store: &SqliteStore,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Result<TaskOutcome, TierlogError> {
    let outcome = match task {
        MaintenanceTask::Archive => {
            let migrator =
                ArchiveMigrator::new(store.clone()).with_throttle(config.archive.throttle());
            let report = migrator
                .migrate_older_than(
                    config.archive.archive_after_days,
                    config.archive.batch_size,
                    shutdown,
                )
                .await?;
            TaskOutcome::Archived(report)
        }
        MaintenanceTask::Cleanup => {
            let reaper = RetentionReaper::new(store.cold()).with_throttle(config.retention.throttle());
            let report = reaper
                .purge_older_than(
                    config.retention.purge_after_days,
                    config.retention.batch_size,
                    shutdown,
                )
                .await?;
            TaskOutcome::Purged(report)
        }
        MaintenanceTask::Optimize => TaskOutcome::Optimized(store.optimize().await?),
        MaintenanceTask::Stats => {
            let stats = store.stats().await?;
            tracing::info!(
                hot = stats.hot_count,
                cold = stats.cold_count,
                compressed = stats.compressed_count,
                total = stats.total_count(),
                "conversation store stats"
            );
            if stats.hot_count > config.stats.log_threshold {
                tracing::warn!(
                    hot = stats.hot_count,
                    threshold = config.stats.log_threshold,
                    "hot tier is large, consider archiving sooner"
                );
            }
            TaskOutcome::Stats(stats)
        }
    };
    Ok(outcome)
}
