use crate::store::types::{ArchivedRecord, CompressedRecord, ConversationRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

pub(super) fn conversation_from_row(row: &SqliteRow) -> Result<ConversationRecord, sqlx::Error> {
    Ok(ConversationRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        model_name: row.try_get("model_name")?,
        token_id: row.try_get("token_id")?,
        token_name: row.try_get("token_name")?,
        channel_id: row.try_get("channel_id")?,
        request_payload: row.try_get("request_payload")?,
        response_payload: row.try_get("response_payload")?,
        prompt_tokens: row.try_get("prompt_tokens")?,
        completion_tokens: row.try_get("completion_tokens")?,
        total_tokens: row.try_get("total_tokens")?,
        is_stream: row.try_get("is_stream")?,
        created_at: row.try_get("created_at")?,
        use_time_ms: row.try_get("use_time_ms")?,
        client_ip: row.try_get("client_ip")?,
        group: row.try_get("group_name")?,
    })
}

pub(super) fn archived_from_row(row: &SqliteRow) -> Result<ArchivedRecord, sqlx::Error> {
    Ok(ArchivedRecord {
        record: conversation_from_row(row)?,
        archived_at: row.try_get("archived_at")?,
        batch_token: row.try_get("batch_token")?,
    })
}

pub(super) fn compressed_from_row(row: &SqliteRow) -> Result<CompressedRecord, sqlx::Error> {
    let request_blob: Option<Vec<u8>> = row.try_get("request_blob")?;
    let response_blob: Option<Vec<u8>> = row.try_get("response_blob")?;
    Ok(CompressedRecord {
        id: row.try_get("id")?,
        source_id: row.try_get("source_id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        model_name: row.try_get("model_name")?,
        token_id: row.try_get("token_id")?,
        token_name: row.try_get("token_name")?,
        channel_id: row.try_get("channel_id")?,
        request_blob: request_blob.unwrap_or_default(),
        response_blob: response_blob.unwrap_or_default(),
        prompt_tokens: row.try_get("prompt_tokens")?,
        completion_tokens: row.try_get("completion_tokens")?,
        total_tokens: row.try_get("total_tokens")?,
        is_stream: row.try_get("is_stream")?,
        created_at: row.try_get("created_at")?,
        use_time_ms: row.try_get("use_time_ms")?,
        client_ip: row.try_get("client_ip")?,
        group: row.try_get("group_name")?,
        compression_ratio: row.try_get("compression_ratio")?,
    })
}
