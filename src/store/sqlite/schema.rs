use sqlx::SqlitePool;

pub(super) const HOT_TABLE: &str = "conversations";
pub(super) const COLD_TABLE: &str = "conversations_archive";
pub(super) const COMPRESSED_TABLE: &str = "conversations_compressed";

/// Columns shared by the hot and cold tables, in row-mapping order.
pub(super) const RECORD_COLUMNS: &str = "id, user_id, username, model_name, token_id, token_name, \
     channel_id, request_payload, response_payload, prompt_tokens, completion_tokens, \
     total_tokens, is_stream, created_at, use_time_ms, client_ip, group_name";

pub(super) const ARCHIVE_COLUMNS: &str = "id, user_id, username, model_name, token_id, token_name, \
     channel_id, request_payload, response_payload, prompt_tokens, completion_tokens, \
     total_tokens, is_stream, created_at, use_time_ms, client_ip, group_name, \
     archived_at, batch_token";

pub(super) const COMPRESSED_COLUMNS: &str = "id, source_id, user_id, username, model_name, \
     token_id, token_name, channel_id, request_blob, response_blob, prompt_tokens, \
     completion_tokens, total_tokens, is_stream, created_at, use_time_ms, client_ip, \
     group_name, compression_ratio";

/// Create every table and index. Safe to run on an existing database.
pub(super) async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        "-- Hot tier: AUTOINCREMENT keeps identities from ever being reused
        CREATE TABLE IF NOT EXISTS conversations (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id           INTEGER NOT NULL,
            username          TEXT    NOT NULL DEFAULT '',
            model_name        TEXT    NOT NULL DEFAULT '',
            token_id          INTEGER NOT NULL DEFAULT 0,
            token_name        TEXT    NOT NULL DEFAULT '',
            channel_id        INTEGER NOT NULL DEFAULT 0,
            request_payload   TEXT    NOT NULL DEFAULT '',
            response_payload  TEXT    NOT NULL DEFAULT '',
            prompt_tokens     INTEGER NOT NULL DEFAULT 0,
            completion_tokens INTEGER NOT NULL DEFAULT 0,
            total_tokens      INTEGER NOT NULL DEFAULT 0,
            is_stream         INTEGER NOT NULL DEFAULT 0,
            created_at        INTEGER NOT NULL,
            use_time_ms       INTEGER NOT NULL DEFAULT 0,
            client_ip         TEXT    NOT NULL DEFAULT '',
            group_name        TEXT    NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_conversations_user_model_time
            ON conversations(user_id, model_name, created_at);
        CREATE INDEX IF NOT EXISTS idx_conversations_created_at
            ON conversations(created_at);
        CREATE INDEX IF NOT EXISTS idx_conversations_username
            ON conversations(username);

        -- Cold tier: id is the hot identity carried forward
        CREATE TABLE IF NOT EXISTS conversations_archive (
            id                INTEGER PRIMARY KEY,
            user_id           INTEGER NOT NULL,
            username          TEXT    NOT NULL DEFAULT '',
            model_name        TEXT    NOT NULL DEFAULT '',
            token_id          INTEGER NOT NULL DEFAULT 0,
            token_name        TEXT    NOT NULL DEFAULT '',
            channel_id        INTEGER NOT NULL DEFAULT 0,
            request_payload   TEXT    NOT NULL DEFAULT '',
            response_payload  TEXT    NOT NULL DEFAULT '',
            prompt_tokens     INTEGER NOT NULL DEFAULT 0,
            completion_tokens INTEGER NOT NULL DEFAULT 0,
            total_tokens      INTEGER NOT NULL DEFAULT 0,
            is_stream         INTEGER NOT NULL DEFAULT 0,
            created_at        INTEGER NOT NULL,
            use_time_ms       INTEGER NOT NULL DEFAULT 0,
            client_ip         TEXT    NOT NULL DEFAULT '',
            group_name        TEXT    NOT NULL DEFAULT '',
            archived_at       INTEGER NOT NULL,
            batch_token       TEXT    NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_conversations_archive_user_model_time
            ON conversations_archive(user_id, model_name, created_at);
        CREATE INDEX IF NOT EXISTS idx_conversations_archive_created_at
            ON conversations_archive(created_at);
        CREATE INDEX IF NOT EXISTS idx_conversations_archive_username
            ON conversations_archive(username);
        CREATE INDEX IF NOT EXISTS idx_conversations_archive_batch
            ON conversations_archive(batch_token);

        -- Compressed variant
        CREATE TABLE IF NOT EXISTS conversations_compressed (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id         INTEGER UNIQUE,
            user_id           INTEGER NOT NULL,
            username          TEXT    NOT NULL DEFAULT '',
            model_name        TEXT    NOT NULL DEFAULT '',
            token_id          INTEGER NOT NULL DEFAULT 0,
            token_name        TEXT    NOT NULL DEFAULT '',
            channel_id        INTEGER NOT NULL DEFAULT 0,
            request_blob      BLOB,
            response_blob     BLOB,
            prompt_tokens     INTEGER NOT NULL DEFAULT 0,
            completion_tokens INTEGER NOT NULL DEFAULT 0,
            total_tokens      INTEGER NOT NULL DEFAULT 0,
            is_stream         INTEGER NOT NULL DEFAULT 0,
            created_at        INTEGER NOT NULL,
            use_time_ms       INTEGER NOT NULL DEFAULT 0,
            client_ip         TEXT    NOT NULL DEFAULT '',
            group_name        TEXT    NOT NULL DEFAULT '',
            compression_ratio REAL    NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_conversations_compressed_user_model_time
            ON conversations_compressed(user_id, model_name, created_at);
        CREATE INDEX IF NOT EXISTS idx_conversations_compressed_created_at
            ON conversations_compressed(created_at);",
    )
    .execute(pool)
    .await?;
    Ok(())
}
