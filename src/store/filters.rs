use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Filters shared by every tier's count, page and delete operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Exact match.
    pub user_id: Option<i64>,
    /// Substring match.
    pub model_name: Option<String>,
    /// Exact match.
    pub username: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub start_time: Option<i64>,
    /// Inclusive upper bound on `created_at`.
    pub end_time: Option<i64>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_time_range(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Drops empty strings so they behave like absent filters.
    pub fn normalized(mut self) -> Self {
        self.model_name = self.model_name.filter(|m| !m.trim().is_empty());
        self.username = self.username.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && start > end
        {
            return Err(ValidationError::InvertedTimeRange { start, end });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.model_name.is_none()
            && self.username.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_dropped() {
        let filters = QueryFilters::new()
            .with_model_name("  ")
            .with_username("")
            .normalized();
        assert!(filters.is_empty());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filters = QueryFilters::new().with_time_range(Some(20), Some(10));
        assert_eq!(
            filters.validate(),
            Err(ValidationError::InvertedTimeRange { start: 20, end: 10 })
        );
    }

    #[test]
    fn open_ranges_are_valid() {
        assert!(
            QueryFilters::new()
                .with_time_range(Some(20), None)
                .validate()
                .is_ok()
        );
        assert!(
            QueryFilters::new()
                .with_time_range(Some(5), Some(5))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("gpt_4%"), "gpt\\_4\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("claude"), "claude");
    }
}
