use crate::error::{MaintenanceError, StorageError};
use crate::store::types::BatchOutcome;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Pause between batches unless configured otherwise.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Outcome of a complete batched run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRunReport {
    /// Records moved or deleted across all committed batches.
    pub processed: u64,
    /// Batches that committed at least one row.
    pub batches: u64,
    /// The run stopped early on the shutdown signal.
    pub cancelled: bool,
}

/// A shutdown receiver that never fires, for one-off runs.
pub fn never_cancelled() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

/// Resolves once the signal is raised. Never resolves if the sender is gone
/// without having raised it.
pub(crate) async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Drive `step` until a batch comes back short.
///
/// The signal is checked before each batch; a batch already started always
/// runs to completion. Termination looks only at the current batch's own
/// `selected` count.
pub(crate) async fn run_batched<F, Fut>(
    task: &'static str,
    batch_size: usize,
    throttle: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut step: F,
) -> Result<BatchRunReport, MaintenanceError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<BatchOutcome, StorageError>>,
{
    let full_batch = u64::try_from(batch_size).unwrap_or(u64::MAX);
    let mut report = BatchRunReport::default();

    loop {
        if *shutdown.borrow() {
            report.cancelled = true;
            break;
        }

        let outcome = match step(batch_size).await {
            Ok(outcome) => outcome,
            Err(source) => {
                return Err(MaintenanceError::Batch {
                    task,
                    processed: report.processed,
                    batches: report.batches,
                    source,
                });
            }
        };
        if outcome.selected == 0 {
            break;
        }

        report.batches += 1;
        report.processed += outcome.moved;
        tracing::debug!(
            task,
            batch = report.batches,
            selected = outcome.selected,
            processed = outcome.moved,
            "batch committed"
        );

        if outcome.selected < full_batch {
            break;
        }

        if !throttle.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(throttle) => {}
                () = cancelled(&mut shutdown) => {}
            }
        }
    }

    tracing::info!(
        task,
        processed = report.processed,
        batches = report.batches,
        cancelled = report.cancelled,
        "batched run finished"
    );
    Ok(report)
}
