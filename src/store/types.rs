use crate::compression;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// A conversation as handed over by the recorder, before the store assigns
/// an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConversation {
    pub user_id: i64,
    pub username: String,
    pub model_name: String,
    pub token_id: i64,
    pub token_name: String,
    pub channel_id: i64,
    pub request_payload: String,
    pub response_payload: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub is_stream: bool,
    /// Logical event time, epoch seconds.
    pub created_at: i64,
    pub use_time_ms: i64,
    /// Empty unless the user's privacy settings allow capture.
    pub client_ip: String,
    pub group: String,
}

impl NewConversation {
    pub fn total_tokens(&self) -> i64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// A row of the hot tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub model_name: String,
    pub token_id: i64,
    pub token_name: String,
    pub channel_id: i64,
    pub request_payload: String,
    pub response_payload: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub is_stream: bool,
    pub created_at: i64,
    pub use_time_ms: i64,
    pub client_ip: String,
    pub group: String,
}

impl ConversationRecord {
    pub fn from_new(id: i64, new: NewConversation) -> Self {
        let total_tokens = new.total_tokens();
        Self {
            id,
            user_id: new.user_id,
            username: new.username,
            model_name: new.model_name,
            token_id: new.token_id,
            token_name: new.token_name,
            channel_id: new.channel_id,
            request_payload: new.request_payload,
            response_payload: new.response_payload,
            prompt_tokens: new.prompt_tokens,
            completion_tokens: new.completion_tokens,
            total_tokens,
            is_stream: new.is_stream,
            created_at: new.created_at,
            use_time_ms: new.use_time_ms,
            client_ip: new.client_ip,
            group: new.group,
        }
    }
}

/// A row of the cold tier. Keeps the hot identity in `record.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    #[serde(flatten)]
    pub record: ConversationRecord,
    pub archived_at: i64,
    /// Identifies the migration batch that produced this row.
    pub batch_token: String,
}

impl ArchivedRecord {
    /// `archived_at` is raised to `created_at` when the record's logical time
    /// lies ahead of the batch clock.
    pub fn from_hot(record: ConversationRecord, archived_at: i64, batch_token: &str) -> Self {
        let archived_at = archived_at.max(record.created_at);
        Self {
            record,
            archived_at,
            batch_token: batch_token.to_string(),
        }
    }
}

/// Both payloads of a record, gzip-encoded together.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPayloads {
    pub request_blob: Vec<u8>,
    pub response_blob: Vec<u8>,
    pub compression_ratio: f64,
}

impl CompressedPayloads {
    /// Encodes both payloads or neither.
    pub fn encode(request: &str, response: &str) -> Result<Self, CodecError> {
        let request_blob = compression::encode(request)?;
        let response_blob = compression::encode(response)?;
        let compression_ratio = compression::compression_ratio(
            request.len() + response.len(),
            request_blob.len() + response_blob.len(),
        );
        Ok(Self {
            request_blob,
            response_blob,
            compression_ratio,
        })
    }
}

/// A row of the compressed store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedRecord {
    pub id: i64,
    /// Hot identity this record was moved from, if any.
    pub source_id: Option<i64>,
    pub user_id: i64,
    pub username: String,
    pub model_name: String,
    pub token_id: i64,
    pub token_name: String,
    pub channel_id: i64,
    #[serde(skip)]
    pub request_blob: Vec<u8>,
    #[serde(skip)]
    pub response_blob: Vec<u8>,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub is_stream: bool,
    pub created_at: i64,
    pub use_time_ms: i64,
    pub client_ip: String,
    pub group: String,
    pub compression_ratio: f64,
}

impl CompressedRecord {
    pub(crate) fn from_parts(
        id: i64,
        source_id: Option<i64>,
        new: NewConversation,
        payloads: CompressedPayloads,
    ) -> Self {
        let total_tokens = new.total_tokens();
        Self {
            id,
            source_id,
            user_id: new.user_id,
            username: new.username,
            model_name: new.model_name,
            token_id: new.token_id,
            token_name: new.token_name,
            channel_id: new.channel_id,
            request_blob: payloads.request_blob,
            response_blob: payloads.response_blob,
            prompt_tokens: new.prompt_tokens,
            completion_tokens: new.completion_tokens,
            total_tokens,
            is_stream: new.is_stream,
            created_at: new.created_at,
            use_time_ms: new.use_time_ms,
            client_ip: new.client_ip,
            group: new.group,
            compression_ratio: payloads.compression_ratio,
        }
    }

    /// Decompress into the plain record shape, keeping this record's identity.
    pub fn decode(&self) -> Result<ConversationRecord, CodecError> {
        Ok(ConversationRecord {
            id: self.id,
            user_id: self.user_id,
            username: self.username.clone(),
            model_name: self.model_name.clone(),
            token_id: self.token_id,
            token_name: self.token_name.clone(),
            channel_id: self.channel_id,
            request_payload: compression::decode(&self.request_blob)?,
            response_payload: compression::decode(&self.response_blob)?,
            prompt_tokens: self.prompt_tokens,
            completion_tokens: self.completion_tokens,
            total_tokens: self.total_tokens,
            is_stream: self.is_stream,
            created_at: self.created_at,
            use_time_ms: self.use_time_ms,
            client_ip: self.client_ip.clone(),
            group: self.group.clone(),
        })
    }
}

impl From<ConversationRecord> for NewConversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            user_id: record.user_id,
            username: record.username,
            model_name: record.model_name,
            token_id: record.token_id,
            token_name: record.token_name,
            channel_id: record.channel_id,
            request_payload: record.request_payload,
            response_payload: record.response_payload,
            prompt_tokens: record.prompt_tokens,
            completion_tokens: record.completion_tokens,
            is_stream: record.is_stream,
            created_at: record.created_at,
            use_time_ms: record.use_time_ms,
            client_ip: record.client_ip,
            group: record.group,
        }
    }
}

/// Storage tier a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Hot,
    Cold,
}

/// Sort key of a record in page order, without its payloads.
///
/// Derived ordering is ascending; pages list keys in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub created_at: i64,
    pub id: i64,
}

/// Result of one migration batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Eligible rows the batch picked up. Drives loop termination.
    pub selected: u64,
    /// Rows removed from the hot tier by this batch.
    pub moved: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_count: u64,
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub hot_count: u64,
    pub cold_count: u64,
    pub compressed_count: u64,
    pub oldest_hot_created_at: Option<i64>,
    pub newest_hot_created_at: Option<i64>,
    /// Table plus index bytes, when the engine exposes them.
    pub hot_bytes: Option<u64>,
    pub cold_bytes: Option<u64>,
}

impl StorageStats {
    pub fn total_count(&self) -> u64 {
        self.hot_count + self.cold_count + self.compressed_count
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub pages_before: u64,
    pub pages_after: u64,
}
