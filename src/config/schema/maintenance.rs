use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hot-to-cold migration schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Records older than this many days move to the archive.
    #[serde(default = "default_archive_after_days")]
    pub archive_after_days: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_archive_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_archive_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

/// Archive purge schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Archived records older than this many days are deleted for good.
    #[serde(default = "default_purge_after_days")]
    pub purge_after_days: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_retention_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_retention_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeConfig {
    #[serde(default = "default_optimize_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_optimize_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_stats_initial_delay_secs")]
    pub initial_delay_secs: u64,
    /// Warn when the hot tier holds more rows than this.
    #[serde(default = "default_log_threshold")]
    pub log_threshold: u64,
}

fn default_archive_after_days() -> u32 {
    30
}
fn default_purge_after_days() -> u32 {
    365
}
fn default_batch_size() -> usize {
    1000
}
fn default_throttle_ms() -> u64 {
    100
}
fn default_archive_interval_hours() -> u64 {
    24
}
fn default_archive_initial_delay_secs() -> u64 {
    60
}
fn default_retention_interval_hours() -> u64 {
    24 * 7
}
fn default_retention_initial_delay_secs() -> u64 {
    120
}
fn default_optimize_interval_hours() -> u64 {
    24 * 30
}
fn default_optimize_initial_delay_secs() -> u64 {
    180
}
fn default_stats_interval_hours() -> u64 {
    1
}
fn default_stats_initial_delay_secs() -> u64 {
    900
}
fn default_log_threshold() -> u64 {
    100_000
}

fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_after_days: default_archive_after_days(),
            batch_size: default_batch_size(),
            throttle_ms: default_throttle_ms(),
            interval_hours: default_archive_interval_hours(),
            initial_delay_secs: default_archive_initial_delay_secs(),
        }
    }
}

impl ArchiveConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
    pub fn interval(&self) -> Duration {
        hours(self.interval_hours)
    }
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            purge_after_days: default_purge_after_days(),
            batch_size: default_batch_size(),
            throttle_ms: default_throttle_ms(),
            interval_hours: default_retention_interval_hours(),
            initial_delay_secs: default_retention_initial_delay_secs(),
        }
    }
}

impl RetentionConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
    pub fn interval(&self) -> Duration {
        hours(self.interval_hours)
    }
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_optimize_interval_hours(),
            initial_delay_secs: default_optimize_initial_delay_secs(),
        }
    }
}

impl OptimizeConfig {
    pub fn interval(&self) -> Duration {
        hours(self.interval_hours)
    }
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_stats_interval_hours(),
            initial_delay_secs: default_stats_initial_delay_secs(),
            log_threshold: default_log_threshold(),
        }
    }
}

impl StatsConfig {
    pub fn interval(&self) -> Duration {
        hours(self.interval_hours)
    }
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}
