use std::time::Duration;

use tierlog::archive::{ArchiveMigrator, TwoPhaseMover, never_cancelled};
use tierlog::error::{MaintenanceError, StorageError};
use tierlog::store::{
    ArchivedRecord, BatchMover, ColdTier, HotTier, SqliteColdTier, SqliteHotTier, SqliteStore,
};

use super::harness;

/// Hot rows in one database, archive in another: no shared transaction.
async fn split_stores() -> (SqliteStore, SqliteStore) {
    (harness::memory_store().await, harness::memory_store().await)
}

fn two_phase(hot: &SqliteStore, cold: &SqliteStore) -> TwoPhaseMover<SqliteHotTier, SqliteColdTier> {
    TwoPhaseMover::new(hot.hot(), cold.cold())
}

#[tokio::test]
async fn moves_across_separate_databases() {
    let (hot, cold) = split_stores().await;
    let ids = harness::seed_aged(&hot, 12, 40).await;

    let report = ArchiveMigrator::new(two_phase(&hot, &cold))
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 5, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 12);
    assert_eq!(report.batches, 3);
    assert_eq!(harness::tier_counts(&hot).await.0, 0);
    assert_eq!(cold.cold().existing_ids(&ids).await.unwrap(), ids);
}

#[tokio::test]
async fn replay_after_interrupted_delete_finishes_move() {
    let (hot, cold) = split_stores().await;
    let ids = harness::seed_aged(&hot, 4, 40).await;

    // Phase one of an earlier run committed, phase two never happened.
    let first = hot.hot().get(ids[0]).await.unwrap().unwrap();
    let stale = ArchivedRecord::from_hot(first, harness::now(), "earlier-run");
    cold.cold().insert_batch(&[stale]).await.unwrap();

    let outcome = two_phase(&hot, &cold)
        .move_batch(harness::now(), 10, harness::now())
        .await
        .unwrap();

    assert_eq!(outcome.selected, 4);
    assert_eq!(outcome.moved, 4);
    assert_eq!(harness::tier_counts(&hot).await.0, 0);
    assert_eq!(harness::tier_counts(&cold).await.1, 4);

    let kept = cold
        .cold()
        .select_page(&tierlog::store::QueryFilters::new(), 0, 10)
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.record.id == ids[0])
        .unwrap();
    assert_eq!(kept.batch_token, "earlier-run");
}

#[tokio::test]
async fn failed_cold_write_leaves_hot_rows_in_place() {
    let (hot, cold) = split_stores().await;
    let ids = harness::seed_aged(&hot, 6, 40).await;
    harness::fail_archive_insert_of(&cold, ids[3]).await;

    let err = ArchiveMigrator::new(two_phase(&hot, &cold))
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MaintenanceError::Batch {
            processed: 0,
            source: StorageError::Sqlx(_),
            ..
        }
    ));
    assert_eq!(harness::tier_counts(&hot).await.0, 6);
    assert_eq!(harness::tier_counts(&cold).await.1, 0);

    harness::clear_archive_failure(&cold).await;
    let report = ArchiveMigrator::new(two_phase(&hot, &cold))
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .unwrap();
    assert_eq!(report.processed, 6);
    assert_eq!(harness::tier_counts(&hot).await.0, 0);
    assert_eq!(cold.cold().existing_ids(&ids).await.unwrap(), ids);
}
