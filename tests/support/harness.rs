#![allow(dead_code)]

use chrono::Utc;
use tierlog::store::{ColdTier, HotTier, NewConversation, QueryFilters, SqliteStore};

pub const DAY: i64 = 86_400;

pub fn now() -> i64 {
    Utc::now().timestamp()
}

pub fn conversation(user_id: i64, model: &str, created_at: i64) -> NewConversation {
    NewConversation {
        user_id,
        username: format!("user-{user_id}"),
        model_name: model.to_string(),
        token_name: "default".into(),
        request_payload: format!(r#"[{{"role":"user","content":"hello at {created_at}"}}]"#),
        response_payload: format!("reply at {created_at}"),
        prompt_tokens: 12,
        completion_tokens: 30,
        created_at,
        use_time_ms: 250,
        group: "default".into(),
        ..NewConversation::default()
    }
}

pub async fn memory_store() -> SqliteStore {
    SqliteStore::in_memory()
        .await
        .expect("in-memory store should open")
}

/// Insert `count` records for user 1, one second apart, all at least
/// `days_old` days before now. Returns identities in insertion order.
pub async fn seed_aged(store: &SqliteStore, count: usize, days_old: i64) -> Vec<i64> {
    let base = now() - days_old * DAY;
    let count_i64 = i64::try_from(count).expect("count fits in i64");
    let mut ids = Vec::with_capacity(count);
    for offset in 0..count_i64 {
        let created_at = base - (count_i64 - offset);
        let record = store
            .hot()
            .insert(conversation(1, "gpt-4o", created_at))
            .await
            .expect("seed insert should succeed");
        ids.push(record.id);
    }
    ids
}

/// `(hot, cold)` row counts.
pub async fn tier_counts(store: &SqliteStore) -> (u64, u64) {
    let all = QueryFilters::new();
    let hot = store.hot().count(&all).await.expect("hot count");
    let cold = store.cold().count(&all).await.expect("cold count");
    (hot, cold)
}

/// Make every archive insert of identity `id` abort.
pub async fn fail_archive_insert_of(store: &SqliteStore, id: i64) {
    sqlx::raw_sql(&format!(
        "CREATE TRIGGER fail_archive BEFORE INSERT ON conversations_archive
         WHEN NEW.id = {id} BEGIN SELECT RAISE(ABORT, 'forced failure'); END;"
    ))
    .execute(store.pool())
    .await
    .expect("trigger should install");
}

pub async fn clear_archive_failure(store: &SqliteStore) {
    sqlx::raw_sql("DROP TRIGGER IF EXISTS fail_archive")
        .execute(store.pool())
        .await
        .expect("trigger should drop");
}
