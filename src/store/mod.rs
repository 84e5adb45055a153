pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use filters::QueryFilters;
pub use sqlite::{SqliteColdTier, SqliteHotTier, SqliteStore};
pub use traits::{BatchMover, ColdTier, HotTier, StoreFuture};
pub use types::{
    ArchivedRecord, BatchOutcome, CompressedPayloads, CompressedRecord, ConversationRecord,
    NewConversation, OptimizeReport, PageKey, StorageStats, Tier, UsageSummary,
};
