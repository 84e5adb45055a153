use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tierlog::archive::{ArchiveMigrator, RetentionReaper};
use tierlog::store::{BatchMover, BatchOutcome, SqliteStore, StoreFuture};
use tokio::sync::watch;

use super::harness;

/// Raises the shutdown signal once `stop_after` batches have committed.
struct StoppingMover {
    inner: SqliteStore,
    shutdown: watch::Sender<bool>,
    calls: AtomicU64,
    stop_after: u64,
}

impl BatchMover for StoppingMover {
    fn move_batch(
        &self,
        cutoff: i64,
        limit: usize,
        archived_at: i64,
    ) -> StoreFuture<'_, BatchOutcome> {
        Box::pin(async move {
            let outcome = self.inner.move_batch(cutoff, limit, archived_at).await?;
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.stop_after {
                let _ = self.shutdown.send(true);
            }
            Ok(outcome)
        })
    }
}

#[tokio::test]
async fn raised_signal_stops_before_first_batch() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 10, 40).await;
    let (tx, rx) = watch::channel(true);

    let report = ArchiveMigrator::new(store.clone())
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 3, rx)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.processed, 0);
    assert_eq!(harness::tier_counts(&store).await, (10, 0));
    drop(tx);
}

#[tokio::test]
async fn signal_takes_effect_at_batch_boundary() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 20, 40).await;
    let (tx, rx) = watch::channel(false);
    let mover = StoppingMover {
        inner: store.clone(),
        shutdown: tx,
        calls: AtomicU64::new(0),
        stop_after: 2,
    };

    let report = ArchiveMigrator::new(mover)
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 5, rx)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.processed, 10);
    assert_eq!(report.batches, 2);
    assert_eq!(harness::tier_counts(&store).await, (10, 10));

    // A later run picks up the remainder.
    let report = ArchiveMigrator::new(store.clone())
        .with_throttle(Duration::ZERO)
        .migrate_older_than(30, 5, tierlog::archive::never_cancelled())
        .await
        .unwrap();
    assert_eq!(report.processed, 10);
    assert_eq!(harness::tier_counts(&store).await, (0, 20));
}

#[tokio::test]
async fn signal_interrupts_throttle_wait() {
    let store = harness::memory_store().await;
    harness::seed_aged(&store, 20, 40).await;
    let (tx, rx) = watch::channel(false);

    let run = tokio::spawn({
        let store = store.clone();
        async move {
            ArchiveMigrator::new(store)
                .with_throttle(Duration::from_secs(3600))
                .migrate_older_than(30, 5, rx)
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let report = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run should stop promptly")
        .unwrap()
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(report.processed, 5);
}

#[tokio::test]
async fn purge_honours_raised_signal() {
    let store = harness::memory_store().await;
    let (_tx, rx) = watch::channel(true);

    let report = RetentionReaper::new(store.cold())
        .with_throttle(Duration::ZERO)
        .purge_older_than(30, 10, rx)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.processed, 0);
}
