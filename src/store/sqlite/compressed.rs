use super::SqliteStore;
use super::hot::fetch_by_id;
use super::rows::compressed_from_row;
use super::schema::{COMPRESSED_COLUMNS, COMPRESSED_TABLE, HOT_TABLE};
use super::sql;
use crate::error::StorageError;
use crate::store::types::{
    CompressedPayloads, CompressedRecord, ConversationRecord, NewConversation,
};

/// Empty payloads are stored as NULL rather than an empty blob.
fn blob_or_null(blob: &[u8]) -> Option<&[u8]> {
    (!blob.is_empty()).then_some(blob)
}

async fn insert_compressed<'e, E>(
    executor: E,
    source_id: Option<i64>,
    record: &NewConversation,
    payloads: &CompressedPayloads,
) -> Result<i64, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO conversations_compressed (
             source_id, user_id, username, model_name, token_id, token_name, channel_id,
             request_blob, response_blob, prompt_tokens, completion_tokens, total_tokens,
             is_stream, created_at, use_time_ms, client_ip, group_name, compression_ratio
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
    )
    .bind(source_id)
    .bind(record.user_id)
    .bind(&record.username)
    .bind(&record.model_name)
    .bind(record.token_id)
    .bind(&record.token_name)
    .bind(record.channel_id)
    .bind(blob_or_null(&payloads.request_blob))
    .bind(blob_or_null(&payloads.response_blob))
    .bind(record.prompt_tokens)
    .bind(record.completion_tokens)
    .bind(record.total_tokens())
    .bind(record.is_stream)
    .bind(record.created_at)
    .bind(record.use_time_ms)
    .bind(&record.client_ip)
    .bind(&record.group)
    .bind(payloads.compression_ratio)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

impl SqliteStore {
    /// Write a record straight into the compressed table. Nothing is written
    /// unless both payloads encode.
    pub async fn record_compressed(
        &self,
        record: NewConversation,
    ) -> Result<CompressedRecord, StorageError> {
        let payloads =
            CompressedPayloads::encode(&record.request_payload, &record.response_payload)?;
        let id = insert_compressed(&self.pool, None, &record, &payloads).await?;
        Ok(CompressedRecord::from_parts(id, None, record, payloads))
    }

    /// Stored form, blobs still encoded.
    pub async fn get_compressed_raw(
        &self,
        id: i64,
    ) -> Result<Option<CompressedRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {COMPRESSED_COLUMNS} FROM {COMPRESSED_TABLE} WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(compressed_from_row).transpose()?)
    }

    /// Decoded record. A blob that fails to decode is reported as
    /// [`StorageError::Unreadable`].
    pub async fn get_compressed(
        &self,
        id: i64,
    ) -> Result<Option<ConversationRecord>, StorageError> {
        let Some(stored) = self.get_compressed_raw(id).await? else {
            return Ok(None);
        };
        stored
            .decode()
            .map(Some)
            .map_err(|source| StorageError::Unreadable { id, source })
    }

    /// Move one hot record into the compressed table, keeping its hot
    /// identity as `source_id`.
    pub async fn compress_hot_record(&self, id: i64) -> Result<CompressedRecord, StorageError> {
        let mut tx = self.pool.begin().await?;
        let record = fetch_by_id(&mut *tx, id)
            .await?
            .ok_or(StorageError::NotFound(id))?;

        let new = NewConversation::from(record);
        let payloads = CompressedPayloads::encode(&new.request_payload, &new.response_payload)?;
        let compressed_id = insert_compressed(&mut *tx, Some(id), &new, &payloads).await?;
        sql::delete_ids(&mut tx, HOT_TABLE, &[id]).await?;
        tx.commit().await?;

        tracing::debug!(
            source_id = id,
            compressed_id,
            ratio = payloads.compression_ratio,
            "compressed hot record"
        );
        Ok(CompressedRecord::from_parts(
            compressed_id,
            Some(id),
            new,
            payloads,
        ))
    }
}
