use std::collections::HashSet;
use std::time::Duration;

use tierlog::archive::{ArchiveMigrator, never_cancelled};
use tierlog::error::{MaintenanceError, StorageError, ValidationError};
use tierlog::store::{ColdTier, HotTier, QueryFilters, SqliteStore};

use super::harness::{self, DAY};

fn migrator(store: &SqliteStore) -> ArchiveMigrator<SqliteStore> {
    ArchiveMigrator::new(store.clone()).with_throttle(Duration::ZERO)
}

#[tokio::test]
async fn aged_records_move_in_bounded_batches() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 25, 40).await;

    let report = migrator(&store)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .expect("migration should succeed");

    assert_eq!(report.processed, 25);
    assert_eq!(report.batches, 3);
    assert!(!report.cancelled);
    assert_eq!(harness::tier_counts(&store).await, (0, 25));
}

#[tokio::test]
async fn records_newer_than_cutoff_stay_hot() {
    let store = harness::memory_store().await;
    let old = harness::seed_aged(&store, 5, 40).await;
    let recent = harness::seed_aged(&store, 4, 1).await;

    let report = migrator(&store)
        .migrate_older_than(30, 100, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 5);
    assert_eq!(report.batches, 1);
    assert_eq!(store.cold().existing_ids(&old).await.unwrap(), old);
    assert!(store.cold().existing_ids(&recent).await.unwrap().is_empty());
    for id in recent {
        assert!(store.hot().get(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn every_record_lands_in_exactly_one_tier() {
    for batch_size in [1, 3, 7, 23, 100] {
        let store = harness::memory_store().await;
        let ids = harness::seed_aged(&store, 23, 40).await;

        let report = migrator(&store)
            .migrate_older_than(30, batch_size, never_cancelled())
            .await
            .unwrap();

        assert_eq!(report.processed, 23, "batch size {batch_size}");
        assert_eq!(harness::tier_counts(&store).await, (0, 23));
        let archived = store.cold().existing_ids(&ids).await.unwrap();
        assert_eq!(archived.len(), ids.len(), "batch size {batch_size}");
        let unique: HashSet<i64> = archived.into_iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}

#[tokio::test]
async fn run_stops_after_short_batch() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 3 * 4 + 2, 40).await;

    let report = migrator(&store)
        .migrate_older_than(30, 4, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 14);
    assert_eq!(report.batches, 4);
}

#[tokio::test]
async fn empty_hot_tier_is_a_no_op() {
    let store = harness::memory_store().await;

    let report = migrator(&store)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.batches, 0);
}

#[tokio::test]
async fn archived_rows_keep_identity_and_batch_token() {
    let store = harness::memory_store().await;
    let ids = harness::seed_aged(&store, 6, 40).await;
    let originals = {
        let mut rows = Vec::new();
        for id in &ids {
            rows.push(store.hot().get(*id).await.unwrap().unwrap());
        }
        rows
    };

    migrator(&store)
        .migrate_older_than(30, 4, never_cancelled())
        .await
        .unwrap();

    let archived = store
        .cold()
        .select_page(&QueryFilters::new(), 0, 100)
        .await
        .unwrap();
    assert_eq!(archived.len(), 6);

    for row in &archived {
        let original = originals
            .iter()
            .find(|r| r.id == row.record.id)
            .expect("archived row keeps its hot identity");
        assert_eq!(&row.record, original);
        assert!(row.archived_at >= row.record.created_at);
        assert!(!row.batch_token.is_empty());
    }

    let tokens: HashSet<&str> = archived.iter().map(|r| r.batch_token.as_str()).collect();
    assert_eq!(tokens.len(), 2, "one token per committed batch");
}

#[tokio::test]
async fn failed_batch_rolls_back_and_rerun_completes() {
    let store = harness::memory_store().await;
    let ids = harness::seed_aged(&store, 25, 40).await;
    harness::fail_archive_insert_of(&store, ids[14]).await;

    let err = migrator(&store)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .expect_err("second batch should fail");

    match &err {
        MaintenanceError::Batch {
            task,
            processed,
            batches,
            source,
        } => {
            assert_eq!(*task, "archive");
            assert_eq!(*processed, 10);
            assert_eq!(*batches, 1);
            assert!(matches!(source, StorageError::Sqlx(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.processed(), 10);
    assert_eq!(harness::tier_counts(&store).await, (15, 10));

    harness::clear_archive_failure(&store).await;
    let report = migrator(&store)
        .migrate_older_than(30, 10, never_cancelled())
        .await
        .unwrap();

    assert_eq!(report.processed, 15);
    assert_eq!(harness::tier_counts(&store).await, (0, 25));
    assert_eq!(store.cold().existing_ids(&ids).await.unwrap().len(), 25);
}

#[tokio::test]
async fn invalid_arguments_are_rejected_before_any_work() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 3, 40).await;
    let migrator = migrator(&store);

    let err = migrator
        .migrate(harness::now() - 30 * DAY, 0, never_cancelled())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::Validation(ValidationError::ZeroBatchSize)
    ));

    let err = migrator.migrate(-1, 10, never_cancelled()).await.unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::Validation(ValidationError::NegativeCutoff(-1))
    ));

    let err = migrator
        .migrate_older_than(0, 10, never_cancelled())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::Validation(ValidationError::ZeroDays)
    ));

    assert_eq!(harness::tier_counts(&store).await, (3, 0));
}
