use super::schema::{ARCHIVE_COLUMNS, COLD_TABLE};
use crate::store::filters::{QueryFilters, escape_like};
use crate::store::types::{ArchivedRecord, PageKey};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Rows per multi-row statement. 19 columns x 500 rows stays far below
/// SQLite's bound-parameter ceiling.
pub(super) const ROWS_PER_STATEMENT: usize = 500;

pub(super) fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub(super) fn row_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

/// Append `WHERE ...` for the given filters. Always emits a WHERE clause.
pub(super) fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &QueryFilters) {
    builder.push(" WHERE 1 = 1");
    if let Some(user_id) = filters.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(model_name) = &filters.model_name {
        builder
            .push(" AND model_name LIKE ")
            .push_bind(format!("%{}%", escape_like(model_name)))
            .push(" ESCAPE '\\'");
    }
    if let Some(username) = &filters.username {
        builder.push(" AND username = ").push_bind(username.clone());
    }
    if let Some(start_time) = filters.start_time {
        builder.push(" AND created_at >= ").push_bind(start_time);
    }
    if let Some(end_time) = filters.end_time {
        builder.push(" AND created_at <= ").push_bind(end_time);
    }
}

/// `ORDER BY` shared by every page query.
pub(super) const PAGE_ORDER: &str = " ORDER BY created_at DESC, id DESC";

pub(super) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, offset: usize, limit: usize) {
    builder
        .push(PAGE_ORDER)
        .push(" LIMIT ")
        .push_bind(sql_count(limit))
        .push(" OFFSET ")
        .push_bind(sql_count(offset));
}

/// Insert archived rows, skipping identities already present.
pub(super) async fn insert_archived(
    conn: &mut SqliteConnection,
    records: &[ArchivedRecord],
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for chunk in records.chunks(ROWS_PER_STATEMENT) {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("INSERT INTO {COLD_TABLE} ({ARCHIVE_COLUMNS}) "));
        builder.push_values(chunk, |mut row, archived| {
            let record = &archived.record;
            row.push_bind(record.id)
                .push_bind(record.user_id)
                .push_bind(record.username.as_str())
                .push_bind(record.model_name.as_str())
                .push_bind(record.token_id)
                .push_bind(record.token_name.as_str())
                .push_bind(record.channel_id)
                .push_bind(record.request_payload.as_str())
                .push_bind(record.response_payload.as_str())
                .push_bind(record.prompt_tokens)
                .push_bind(record.completion_tokens)
                .push_bind(record.total_tokens)
                .push_bind(record.is_stream)
                .push_bind(record.created_at)
                .push_bind(record.use_time_ms)
                .push_bind(record.client_ip.as_str())
                .push_bind(record.group.as_str())
                .push_bind(archived.archived_at)
                .push_bind(archived.batch_token.as_str());
        });
        builder.push(" ON CONFLICT(id) DO NOTHING");
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}

pub(super) async fn delete_ids(
    conn: &mut SqliteConnection,
    table: &str,
    ids: &[i64],
) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;
    for chunk in ids.chunks(ROWS_PER_STATEMENT) {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {table} WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        deleted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(deleted)
}

pub(super) async fn select_present_ids(
    conn: &mut SqliteConnection,
    table: &str,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    let mut present = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ROWS_PER_STATEMENT) {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let found: Vec<i64> = builder
            .build_query_scalar()
            .fetch_all(&mut *conn)
            .await?;
        present.extend(found);
    }
    present.sort_unstable();
    Ok(present)
}

pub(super) async fn select_page_keys(
    conn: &mut SqliteConnection,
    table: &str,
    filters: &QueryFilters,
    offset: usize,
    limit: usize,
) -> Result<Vec<PageKey>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT created_at, id FROM {table}"));
    push_filters(&mut builder, filters);
    push_page(&mut builder, offset, limit);
    let keys: Vec<(i64, i64)> = builder.build_query_as().fetch_all(&mut *conn).await?;
    Ok(keys
        .into_iter()
        .map(|(created_at, id)| PageKey { created_at, id })
        .collect())
}

pub(super) async fn select_rows_by_ids(
    conn: &mut SqliteConnection,
    table: &str,
    columns: &str,
    ids: &[i64],
) -> Result<Vec<SqliteRow>, sqlx::Error> {
    let mut rows = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ROWS_PER_STATEMENT) {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {columns} FROM {table} WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        rows.extend(builder.build().fetch_all(&mut *conn).await?);
    }
    Ok(rows)
}
