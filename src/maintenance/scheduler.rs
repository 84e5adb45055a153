use super::tasks::{MaintenanceTask, run_task};
use crate::archive::batch::cancelled;
use crate::config::ConfigHandle;
use crate::store::SqliteStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Periodic maintenance over one conversation store.
///
/// Each task waits its initial delay, runs, then waits its interval, until the
/// shutdown signal is raised. Settings are read from the config handle at
/// every run, so a reload applies from the next run on.
pub struct MaintenanceScheduler {
    store: SqliteStore,
    config: ConfigHandle,
}

impl MaintenanceScheduler {
    pub fn new(store: SqliteStore, config: ConfigHandle) -> Self {
        Self { store, config }
    }

    /// Spawn one loop per task. Every handle completes after `shutdown`
    /// is raised; a run in progress stops at its next batch boundary.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        MaintenanceTask::ALL
            .into_iter()
            .map(|task| {
                spawn_periodic(
                    task,
                    self.store.clone(),
                    self.config.clone(),
                    shutdown.clone(),
                )
            })
            .collect()
    }
}

fn spawn_periodic(
    task: MaintenanceTask,
    store: SqliteStore,
    config: ConfigHandle,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut wait = task.initial_delay(&config.load());
        tracing::info!(%task, first_run_in = ?wait, "maintenance task scheduled");

        loop {
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = cancelled(&mut shutdown) => break,
            }

            let snapshot = config.load_full();
            match run_task(task, &store, &snapshot, shutdown.clone()).await {
                Ok(outcome) => tracing::info!(%task, ?outcome, "maintenance task finished"),
                Err(error) => tracing::error!(%task, %error, "maintenance task failed"),
            }
            wait = task.interval(&snapshot);
        }

        tracing::info!(%task, "maintenance task stopped");
    })
}
