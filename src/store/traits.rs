use super::filters::QueryFilters;
use super::types::{
    ArchivedRecord, BatchOutcome, ConversationRecord, NewConversation, PageKey, UsageSummary,
};
use crate::error::StorageError;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every tier operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Primary table of active records.
///
/// Pages are ordered by `created_at DESC, id DESC` on every tier so that
/// results from different tiers can be merged into one total order.
pub trait HotTier: Send + Sync {
    fn name(&self) -> &str;

    fn insert(&self, record: NewConversation) -> StoreFuture<'_, ConversationRecord>;

    fn get(&self, id: i64) -> StoreFuture<'_, Option<ConversationRecord>>;

    /// Up to `limit` records with `created_at < cutoff`, ascending identity.
    fn select_aging(&self, cutoff: i64, limit: usize) -> StoreFuture<'_, Vec<ConversationRecord>>;

    /// Idempotent: identities that are already gone are ignored.
    fn delete_by_ids<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, u64>;

    /// Rejects an empty filter set.
    fn delete_matching<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64>;

    fn count<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64>;

    fn select_page<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ConversationRecord>>;

    /// Same rows and order as `select_page`, keys only.
    fn select_page_keys<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<PageKey>>;

    /// Records for the given identities, in no particular order. Missing
    /// identities are skipped.
    fn get_many<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<ConversationRecord>>;

    fn usage_summary<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, UsageSummary>;
}

/// Archive table. Written only by the migrator, emptied only by the reaper.
pub trait ColdTier: Send + Sync {
    fn name(&self) -> &str;

    /// Commits all rows or none. Rows whose identity is already archived are
    /// skipped; the return value counts newly inserted rows.
    fn insert_batch<'a>(&'a self, records: &'a [ArchivedRecord]) -> StoreFuture<'a, u64>;

    /// The subset of `ids` present in this tier.
    fn existing_ids<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<i64>>;

    /// Delete up to `limit` records with `created_at < cutoff`.
    fn purge_batch(&self, cutoff: i64, limit: usize) -> StoreFuture<'_, u64>;

    fn count<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64>;

    fn select_page<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ArchivedRecord>>;

    fn select_page_keys<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<PageKey>>;

    fn get_many<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<ArchivedRecord>>;
}

/// Moves one bounded batch of aging records from the hot to the cold tier.
///
/// After the returned future resolves with `Ok`, every selected record lives
/// in the cold tier only. On `Err` no record may be left in neither tier.
pub trait BatchMover: Send + Sync {
    fn move_batch(
        &self,
        cutoff: i64,
        limit: usize,
        archived_at: i64,
    ) -> StoreFuture<'_, BatchOutcome>;
}
