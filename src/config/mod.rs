pub mod hot_reload;
pub mod schema;

pub use hot_reload::ConfigHandle;
pub use schema::{
    ArchiveConfig, Config, OptimizeConfig, QueryConfig, RecordingConfig, RetentionConfig,
    StatsConfig, StorageConfig,
};
