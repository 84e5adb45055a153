//! Ingestion: turns a finished request/response exchange into a stored record.

pub mod stream;

pub use stream::{ChoiceMessage, StreamContentCollector, StreamDelta, extract_response_content};

use crate::config::ConfigHandle;
use crate::error::StorageError;
use crate::store::SqliteStore;
use crate::store::traits::HotTier;
use crate::store::types::{CompressedRecord, ConversationRecord, NewConversation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Per-user privacy preferences consulted before capturing a client IP.
pub trait PrivacySettings: Send + Sync {
    fn records_client_ip(&self, user_id: i64) -> bool;
}

/// Fixed set of users who opted in to IP capture.
#[derive(Debug, Clone, Default)]
pub struct IpLoggingOptIn {
    users: HashSet<i64>,
}

impl IpLoggingOptIn {
    pub fn new(users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }
}

impl PrivacySettings for IpLoggingOptIn {
    fn records_client_ip(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

/// Everything known about one exchange when it completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordParams {
    pub user_id: i64,
    pub username: String,
    pub model_name: String,
    pub token_id: i64,
    pub token_name: String,
    pub channel_id: i64,
    /// Request messages as sent by the client.
    pub messages: Vec<serde_json::Value>,
    pub response_content: String,
    pub usage: Option<TokenUsage>,
    pub is_stream: bool,
    /// Request start, epoch seconds.
    pub created_at: i64,
    pub use_time_ms: i64,
    /// Only stored when the user's privacy settings allow it.
    pub client_ip: Option<String>,
    pub group: String,
}

/// Where a recorded exchange ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Hot(ConversationRecord),
    Compressed(CompressedRecord),
}

impl Recorded {
    pub fn id(&self) -> i64 {
        match self {
            Self::Hot(record) => record.id,
            Self::Compressed(record) => record.id,
        }
    }
}

pub struct ConversationRecorder {
    config: ConfigHandle,
    store: SqliteStore,
    privacy: Arc<dyn PrivacySettings>,
}

impl ConversationRecorder {
    pub fn new(config: ConfigHandle, store: SqliteStore, privacy: Arc<dyn PrivacySettings>) -> Self {
        Self {
            config,
            store,
            privacy,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.load().recording.enabled
    }

    /// Switch recording on or off for every holder of the config handle.
    pub fn set_enabled(&self, enabled: bool) {
        self.config
            .update(|config| config.recording.enabled = enabled);
        tracing::info!(enabled, "conversation recording toggled");
    }

    /// Store one exchange.
    ///
    /// Returns `Ok(None)` without touching storage when recording is off,
    /// the request carried no messages, or the response is empty.
    pub async fn record(&self, params: RecordParams) -> Result<Option<Recorded>, StorageError> {
        let recording = self.config.load().recording.clone();
        if !recording.enabled {
            return Ok(None);
        }
        if params.messages.is_empty() || params.response_content.is_empty() {
            tracing::debug!(user_id = params.user_id, "nothing to record");
            return Ok(None);
        }

        let record = self.build_record(params)?;
        let recorded = if recording.compress {
            Recorded::Compressed(self.store.record_compressed(record).await?)
        } else {
            Recorded::Hot(self.store.hot().insert(record).await?)
        };
        tracing::debug!(id = recorded.id(), compressed = recording.compress, "recorded conversation");
        Ok(Some(recorded))
    }

    /// Record on a background task; failures are logged, never returned.
    pub fn record_in_background(self: &Arc<Self>, params: RecordParams) -> tokio::task::JoinHandle<()> {
        let recorder = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(error) = recorder.record(params).await {
                tracing::error!(%error, "failed to record conversation");
            }
        })
    }

    fn build_record(&self, params: RecordParams) -> Result<NewConversation, StorageError> {
        let request_payload = serde_json::to_string(&params.messages)?;
        let usage = params.usage.unwrap_or_default();
        let client_ip = if self.privacy.records_client_ip(params.user_id) {
            params.client_ip.unwrap_or_default()
        } else {
            String::new()
        };

        Ok(NewConversation {
            user_id: params.user_id,
            username: params.username,
            model_name: params.model_name,
            token_id: params.token_id,
            token_name: params.token_name,
            channel_id: params.channel_id,
            request_payload,
            response_payload: params.response_content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            is_stream: params.is_stream,
            created_at: params.created_at,
            use_time_ms: params.use_time_ms,
            client_ip,
            group: params.group,
        })
    }
}
