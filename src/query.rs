//! Paginated reads spanning the hot and cold tiers.

use crate::error::StorageError;
use crate::store::filters::QueryFilters;
use crate::store::traits::{ColdTier, HotTier};
use crate::store::types::{ArchivedRecord, ConversationRecord, PageKey, Tier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Page-size bounds applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// 1-based page and a page size within bounds. Non-positive pages become
    /// page 1, non-positive sizes the default, oversized ones the cap.
    pub fn normalize(&self, page: i64, page_size: i64) -> (usize, usize) {
        let page = usize::try_from(page).ok().filter(|p| *p > 0).unwrap_or(1);
        let page_size = match usize::try_from(page_size) {
            Ok(0) | Err(_) => self.default_page_size,
            Ok(size) => size.min(self.max_page_size),
        };
        (page, page_size.max(1))
    }
}

/// A record together with the tier it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueriedRecord {
    #[serde(flatten)]
    pub record: ConversationRecord,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPage {
    pub records: Vec<QueriedRecord>,
    /// Matching records across every tier that answered.
    pub total: u64,
    pub page: usize,
    pub page_size: usize,
    pub include_archive: bool,
    /// Set when the archive was requested but could not be read; `records`
    /// and `total` then cover the hot tier only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
}

impl QueryPage {
    pub fn is_complete(&self) -> bool {
        self.archive_error.is_none()
    }

    pub fn total_pages(&self) -> u64 {
        let size = u64::try_from(self.page_size).unwrap_or(u64::MAX).max(1);
        self.total.div_ceil(size)
    }
}

impl QueriedRecord {
    fn hot(record: ConversationRecord) -> Self {
        Self {
            record,
            tier: Tier::Hot,
            archived_at: None,
        }
    }

    fn archived(archived: ArchivedRecord) -> Self {
        Self {
            archived_at: Some(archived.archived_at),
            record: archived.record,
            tier: Tier::Cold,
        }
    }
}

/// Which side of a merged read failed.
enum TierFailure {
    Hot(StorageError),
    Cold(StorageError),
}

fn as_index(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Reads over the hot tier and, on request, the archive.
pub struct UnifiedQuery<H, C> {
    hot: H,
    cold: C,
    limits: PageLimits,
}

impl<H: HotTier, C: ColdTier> UnifiedQuery<H, C> {
    pub fn new(hot: H, cold: C) -> Self {
        Self {
            hot,
            cold,
            limits: PageLimits::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// One page of matching records, newest first.
    ///
    /// Hot-only pages are cut by the hot tier itself. With `include_archive`,
    /// each tier supplies the sort keys of its first `offset + limit` rows,
    /// the page is cut from their merge, and only the winning rows are
    /// loaded. A page past the end is answered from the counts alone. A
    /// failing archive degrades the page to hot-only results and sets
    /// `archive_error`; a failing hot tier fails the query.
    pub async fn query(
        &self,
        filters: QueryFilters,
        page: i64,
        page_size: i64,
        include_archive: bool,
    ) -> Result<QueryPage, StorageError> {
        let filters = filters.normalized();
        filters.validate()?;

        let (page, page_size) = self.limits.normalize(page, page_size);
        let offset = (page - 1).saturating_mul(page_size);
        let hot_total = self.hot.count(&filters).await?;

        let mut archive_error = None;
        if include_archive {
            match self.merged_page(&filters, hot_total, offset, page_size).await {
                Ok((total, records)) => {
                    return Ok(QueryPage {
                        records,
                        total,
                        page,
                        page_size,
                        include_archive,
                        archive_error,
                    });
                }
                Err(TierFailure::Hot(error)) => return Err(error),
                Err(TierFailure::Cold(error)) => {
                    tracing::warn!(
                        tier = self.cold.name(),
                        %error,
                        "archive query failed, returning hot tier only"
                    );
                    archive_error = Some(error.to_string());
                }
            }
        }

        let records = if offset < as_index(hot_total) {
            self.hot
                .select_page(&filters, offset, page_size)
                .await?
                .into_iter()
                .map(QueriedRecord::hot)
                .collect()
        } else {
            Vec::new()
        };

        Ok(QueryPage {
            records,
            total: hot_total,
            page,
            page_size,
            include_archive,
            archive_error,
        })
    }

    async fn merged_page(
        &self,
        filters: &QueryFilters,
        hot_total: u64,
        offset: usize,
        page_size: usize,
    ) -> Result<(u64, Vec<QueriedRecord>), TierFailure> {
        let cold_total = self.cold.count(filters).await.map_err(TierFailure::Cold)?;
        let total = hot_total.saturating_add(cold_total);
        if offset >= as_index(total) {
            return Ok((total, Vec::new()));
        }

        // Hot before cold: a record migrating between the two reads then
        // shows up twice (deduplicated below) rather than not at all.
        let window = offset.saturating_add(page_size);
        let hot_keys = self
            .hot
            .select_page_keys(filters, 0, window)
            .await
            .map_err(TierFailure::Hot)?;
        let cold_keys = self
            .cold
            .select_page_keys(filters, 0, window)
            .await
            .map_err(TierFailure::Cold)?;

        let mut keys: Vec<(Tier, PageKey)> = hot_keys
            .into_iter()
            .map(|key| (Tier::Hot, key))
            .chain(cold_keys.into_iter().map(|key| (Tier::Cold, key)))
            .collect();
        keys.sort_by(|a, b| b.1.cmp(&a.1));
        keys.dedup_by_key(|(_, key)| key.id);
        let winners: Vec<(Tier, PageKey)> =
            keys.into_iter().skip(offset).take(page_size).collect();

        Ok((total, self.load_winners(&winners).await?))
    }

    /// Full rows for `winners`, in their order. A record gone from both
    /// tiers since its key was read is left out.
    async fn load_winners(
        &self,
        winners: &[(Tier, PageKey)],
    ) -> Result<Vec<QueriedRecord>, TierFailure> {
        let ids_in = |tier: Tier| -> Vec<i64> {
            winners
                .iter()
                .filter(|(t, _)| *t == tier)
                .map(|(_, key)| key.id)
                .collect()
        };
        let hot_ids = ids_in(Tier::Hot);
        let cold_ids = ids_in(Tier::Cold);

        let mut hot: HashMap<i64, QueriedRecord> = self
            .hot
            .get_many(&hot_ids)
            .await
            .map_err(TierFailure::Hot)?
            .into_iter()
            .map(|record| (record.id, QueriedRecord::hot(record)))
            .collect();
        let mut cold: HashMap<i64, QueriedRecord> = self
            .cold
            .get_many(&cold_ids)
            .await
            .map_err(TierFailure::Cold)?
            .into_iter()
            .map(|archived| (archived.record.id, QueriedRecord::archived(archived)))
            .collect();

        // Archived after its key was read.
        let moved: Vec<i64> = hot_ids
            .into_iter()
            .filter(|id| !hot.contains_key(id))
            .collect();
        if !moved.is_empty() {
            let archived = self.cold.get_many(&moved).await.map_err(TierFailure::Cold)?;
            cold.extend(
                archived
                    .into_iter()
                    .map(|archived| (archived.record.id, QueriedRecord::archived(archived))),
            );
        }

        Ok(winners
            .iter()
            .filter_map(|(tier, key)| match tier {
                Tier::Hot => hot.remove(&key.id).or_else(|| cold.remove(&key.id)),
                Tier::Cold => cold.remove(&key.id),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_one_based() {
        let limits = PageLimits::default();
        assert_eq!(limits.normalize(0, 10), (1, 10));
        assert_eq!(limits.normalize(-3, 10), (1, 10));
        assert_eq!(limits.normalize(4, 10), (4, 10));
    }

    #[test]
    fn page_size_is_clamped() {
        let limits = PageLimits::default();
        assert_eq!(limits.normalize(1, 0).1, DEFAULT_PAGE_SIZE);
        assert_eq!(limits.normalize(1, -5).1, DEFAULT_PAGE_SIZE);
        assert_eq!(limits.normalize(1, 1_000).1, MAX_PAGE_SIZE);
        assert_eq!(limits.normalize(1, 25).1, 25);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = QueryPage {
            records: Vec::new(),
            total: 21,
            page: 1,
            page_size: 10,
            include_archive: false,
            archive_error: None,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.is_complete());
    }
}
