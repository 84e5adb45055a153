use super::rows::conversation_from_row;
use super::schema::{HOT_TABLE, RECORD_COLUMNS};
use super::sql::{self, push_filters, push_page, row_count, sql_count};
use crate::error::{StorageError, ValidationError};
use crate::store::filters::QueryFilters;
use crate::store::traits::{HotTier, StoreFuture};
use crate::store::types::{ConversationRecord, NewConversation, PageKey, UsageSummary};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Hot tier view over a `SqliteStore` database.
#[derive(Debug, Clone)]
pub struct SqliteHotTier {
    pool: SqlitePool,
}

impl SqliteHotTier {
    pub(super) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(super) async fn insert_conversation<'e, E>(
    executor: E,
    record: &NewConversation,
) -> Result<i64, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO conversations (
             user_id, username, model_name, token_id, token_name, channel_id,
             request_payload, response_payload, prompt_tokens, completion_tokens,
             total_tokens, is_stream, created_at, use_time_ms, client_ip, group_name
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(record.user_id)
    .bind(&record.username)
    .bind(&record.model_name)
    .bind(record.token_id)
    .bind(&record.token_name)
    .bind(record.channel_id)
    .bind(&record.request_payload)
    .bind(&record.response_payload)
    .bind(record.prompt_tokens)
    .bind(record.completion_tokens)
    .bind(record.total_tokens())
    .bind(record.is_stream)
    .bind(record.created_at)
    .bind(record.use_time_ms)
    .bind(&record.client_ip)
    .bind(&record.group)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

pub(super) async fn select_aging<'e, E>(
    executor: E,
    cutoff: i64,
    limit: usize,
) -> Result<Vec<ConversationRecord>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM {HOT_TABLE}
         WHERE created_at < ?1
         ORDER BY id ASC
         LIMIT ?2"
    );
    let rows = sqlx::query(&sql)
        .bind(cutoff)
        .bind(sql_count(limit))
        .fetch_all(executor)
        .await?;
    rows.iter().map(conversation_from_row).collect()
}

pub(super) async fn fetch_by_id<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<ConversationRecord>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let sql = format!("SELECT {RECORD_COLUMNS} FROM {HOT_TABLE} WHERE id = ?1");
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(conversation_from_row).transpose()
}

impl HotTier for SqliteHotTier {
    fn name(&self) -> &str {
        "sqlite-hot"
    }

    fn insert(&self, record: NewConversation) -> StoreFuture<'_, ConversationRecord> {
        Box::pin(async move {
            let id = insert_conversation(&self.pool, &record).await?;
            Ok(ConversationRecord::from_new(id, record))
        })
    }

    fn get(&self, id: i64) -> StoreFuture<'_, Option<ConversationRecord>> {
        Box::pin(async move { Ok(fetch_by_id(&self.pool, id).await?) })
    }

    fn select_aging(&self, cutoff: i64, limit: usize) -> StoreFuture<'_, Vec<ConversationRecord>> {
        Box::pin(async move { Ok(select_aging(&self.pool, cutoff, limit).await?) })
    }

    fn delete_by_ids<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(0);
            }
            let mut tx = self.pool.begin().await?;
            let deleted = sql::delete_ids(&mut tx, HOT_TABLE, ids).await?;
            tx.commit().await?;
            Ok(deleted)
        })
    }

    fn delete_matching<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            if filters.is_empty() {
                return Err(StorageError::Invalid(ValidationError::MissingFilter));
            }
            filters.validate()?;
            let mut builder = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {HOT_TABLE}"));
            push_filters(&mut builder, filters);
            let result = builder.build().execute(&self.pool).await?;
            Ok(result.rows_affected())
        })
    }

    fn count<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {HOT_TABLE}"));
            push_filters(&mut builder, filters);
            let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
            Ok(row_count(count))
        })
    }

    fn select_page<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ConversationRecord>> {
        Box::pin(async move {
            let mut builder =
                QueryBuilder::<Sqlite>::new(format!("SELECT {RECORD_COLUMNS} FROM {HOT_TABLE}"));
            push_filters(&mut builder, filters);
            push_page(&mut builder, offset, limit);
            let rows = builder.build().fetch_all(&self.pool).await?;
            Ok(rows
                .iter()
                .map(conversation_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn select_page_keys<'a>(
        &'a self,
        filters: &'a QueryFilters,
        offset: usize,
        limit: usize,
    ) -> StoreFuture<'a, Vec<PageKey>> {
        Box::pin(async move {
            let mut conn = self.pool.acquire().await?;
            Ok(sql::select_page_keys(&mut conn, HOT_TABLE, filters, offset, limit).await?)
        })
    }

    fn get_many<'a>(&'a self, ids: &'a [i64]) -> StoreFuture<'a, Vec<ConversationRecord>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let mut conn = self.pool.acquire().await?;
            let rows = sql::select_rows_by_ids(&mut conn, HOT_TABLE, RECORD_COLUMNS, ids).await?;
            Ok(rows
                .iter()
                .map(conversation_from_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn usage_summary<'a>(&'a self, filters: &'a QueryFilters) -> StoreFuture<'a, UsageSummary> {
        Box::pin(async move {
            let mut builder = QueryBuilder::<Sqlite>::new(format!(
                "SELECT COUNT(*), COALESCE(SUM(total_tokens), 0),
                        COALESCE(SUM(prompt_tokens), 0), COALESCE(SUM(completion_tokens), 0)
                 FROM {HOT_TABLE}"
            ));
            push_filters(&mut builder, filters);
            let (count, total, prompt, completion): (i64, i64, i64, i64) =
                builder.build_query_as().fetch_one(&self.pool).await?;
            Ok(UsageSummary {
                total_count: row_count(count),
                total_tokens: total,
                prompt_tokens: prompt,
                completion_tokens: completion,
            })
        })
    }
}
