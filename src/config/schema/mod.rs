mod core;
mod maintenance;
mod storage;

pub use core::Config;
pub use maintenance::{ArchiveConfig, OptimizeConfig, RetentionConfig, StatsConfig};
pub use storage::{QueryConfig, RecordingConfig, StorageConfig};
