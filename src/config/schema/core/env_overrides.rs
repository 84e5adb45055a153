use super::Config;
use std::path::PathBuf;

impl Config {
    /// Apply `CONVERSATION_*` and `TIERLOG_*` environment overrides.
    /// Unparseable or non-positive values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(days) = std::env::var("CONVERSATION_ARCHIVE_DAYS")
            && let Ok(days) = days.trim().parse::<u32>()
            && days > 0
        {
            self.archive.archive_after_days = days;
        }

        if let Ok(days) = std::env::var("CONVERSATION_CLEANUP_DAYS")
            && let Ok(days) = days.trim().parse::<u32>()
            && days > 0
        {
            self.retention.purge_after_days = days;
        }

        if let Ok(enabled) = std::env::var("CONVERSATION_LOG_ENABLED")
            && let Some(enabled) = parse_flag(&enabled)
        {
            self.recording.enabled = enabled;
        }

        if let Ok(path) = std::env::var("TIERLOG_DATABASE")
            && !path.is_empty()
        {
            self.storage.database_path = PathBuf::from(path);
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
