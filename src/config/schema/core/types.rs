use super::super::{
    ArchiveConfig, OptimizeConfig, QueryConfig, RecordingConfig, RetentionConfig, StatsConfig,
    StorageConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub recording: RecordingConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Database file. A leading `~` expands to the home directory; other
    /// relative paths are anchored at the config directory.
    pub fn database_path(&self) -> PathBuf {
        let raw = self.storage.database_path.to_string_lossy();
        let path = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        if path.is_absolute() {
            return path;
        }
        self.config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.busy_timeout_secs)
    }
}
