use std::time::Duration;

use tierlog::archive::{ArchiveMigrator, RetentionReaper, never_cancelled};
use tierlog::error::{MaintenanceError, ValidationError};
use tierlog::store::{ColdTier, HotTier, SqliteStore};

use super::harness;

async fn archive_all(store: &SqliteStore) {
    ArchiveMigrator::new(store.clone())
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 100, never_cancelled())
        .await
        .expect("migration should succeed");
}

fn reaper(store: &SqliteStore) -> RetentionReaper<tierlog::store::SqliteColdTier> {
    RetentionReaper::new(store.cold()).with_throttle(Duration::ZERO)
}

#[tokio::test]
async fn expired_archive_rows_are_deleted() {
    let store = harness::memory_store().await;
    let expired = harness::seed_aged(&store, 10, 400).await;
    let kept = harness::seed_aged(&store, 6, 40).await;
    archive_all(&store).await;
    assert_eq!(harness::tier_counts(&store).await, (0, 16));

    let report = reaper(&store)
        .purge_older_than(365, 4, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 10);
    assert_eq!(report.batches, 3);
    assert!(store.cold().existing_ids(&expired).await.unwrap().is_empty());
    assert_eq!(store.cold().existing_ids(&kept).await.unwrap(), kept);
}

#[tokio::test]
async fn purge_never_touches_hot_tier() {
    let store = harness::memory_store().await;
    let ids = harness::seed_aged(&store, 5, 400).await;

    let report = reaper(&store)
        .purge_older_than(365, 10, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    for id in ids {
        assert!(store.hot().get(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn purge_is_repeatable() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 7, 400).await;
    archive_all(&store).await;

    let first = reaper(&store)
        .purge_older_than(365, 7, never_cancelled())
        .await
        .unwrap();
    let second = reaper(&store)
        .purge_older_than(365, 7, never_cancelled())
        .await
        .unwrap();

    assert_eq!(first.processed, 7);
    assert_eq!(second.processed, 0);
    assert_eq!(second.batches, 0);
    assert_eq!(harness::tier_counts(&store).await, (0, 0));
}

#[tokio::test]
async fn zero_batch_size_is_rejected() {
    let store = harness::memory_store().await;
    let err = reaper(&store)
        .purge(harness::now(), 0, never_cancelled())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::Validation(ValidationError::ZeroBatchSize)
    ));
}
