use super::Config;
use crate::error::ConfigError;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive.batch_size == 0 {
            return Err(invalid("archive.batch_size must be >= 1"));
        }
        if self.retention.batch_size == 0 {
            return Err(invalid("retention.batch_size must be >= 1"));
        }
        if self.archive.archive_after_days == 0 {
            return Err(invalid("archive.archive_after_days must be >= 1"));
        }
        if self.retention.purge_after_days == 0 {
            return Err(invalid("retention.purge_after_days must be >= 1"));
        }
        if self.query.default_page_size == 0 {
            return Err(invalid("query.default_page_size must be >= 1"));
        }
        if self.query.default_page_size > self.query.max_page_size {
            return Err(invalid(
                "query.default_page_size must be <= query.max_page_size",
            ));
        }
        for (name, hours) in [
            ("archive", self.archive.interval_hours),
            ("retention", self.retention.interval_hours),
            ("optimize", self.optimize.interval_hours),
            ("stats", self.stats.interval_hours),
        ] {
            if hours == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.interval_hours must be >= 1"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_sizes_are_rejected() {
        let mut config = Config::default();
        config.retention.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retention.batch_size"));
    }

    #[test]
    fn zero_days_are_rejected() {
        let mut config = Config::default();
        config.archive.archive_after_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_page_size_cannot_exceed_cap() {
        let mut config = Config::default();
        config.query.default_page_size = 200;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_page_size"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = Config::default();
        config.stats.interval_hours = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stats.interval_hours"));
    }
}
