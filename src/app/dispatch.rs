use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use tierlog::archive::{ArchiveMigrator, RetentionReaper};
use tierlog::config::ConfigHandle;
use tierlog::maintenance::MaintenanceScheduler;
use tierlog::query::UnifiedQuery;
use tierlog::store::{HotTier, SqliteStore};
use tierlog::Config;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shutdown signal raised on Ctrl-C.
fn ctrl_c_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current batch");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path, config.busy_timeout())
        .await
        .with_context(|| format!("Failed to open conversation store at {}", path.display()))
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(database) = cli.database {
        config.storage.database_path = database;
    }

    if matches!(cli.command, Commands::ConfigShow) {
        return print_json(&config);
    }

    let store = open_store(&config).await?;
    let result = run_command(cli.command, &store, config).await;
    store.close().await;
    result
}

async fn run_command(command: Commands, store: &SqliteStore, config: Config) -> Result<()> {
    match command {
        Commands::Migrate { days, batch_size } => {
            let days = days.unwrap_or(config.archive.archive_after_days);
            let batch_size = batch_size.unwrap_or(config.archive.batch_size);
            let migrator =
                ArchiveMigrator::new(store.clone()).with_throttle(config.archive.throttle());
            let report = migrator
                .migrate_older_than(days, batch_size, ctrl_c_signal())
                .await
                .context("Archive migration failed")?;
            print_json(&report)
        }

        Commands::Purge { days, batch_size } => {
            let days = days.unwrap_or(config.retention.purge_after_days);
            let batch_size = batch_size.unwrap_or(config.retention.batch_size);
            let reaper =
                RetentionReaper::new(store.cold()).with_throttle(config.retention.throttle());
            let report = reaper
                .purge_older_than(days, batch_size, ctrl_c_signal())
                .await
                .context("Archive purge failed")?;
            print_json(&report)
        }

        Commands::Query {
            filters,
            page,
            page_size,
            include_archive,
        } => {
            let query = UnifiedQuery::new(store.hot(), store.cold())
                .with_limits(config.query.page_limits());
            let page = query
                .query(filters.into_filters(), page, page_size, include_archive)
                .await?;
            if let Some(warning) = &page.archive_error {
                tracing::warn!(%warning, "archive tier unavailable, results cover the hot tier only");
            }
            print_json(&page)
        }

        Commands::Get { id, compressed } => {
            let record = if compressed {
                store.get_compressed(id).await?
            } else {
                store.hot().get(id).await?
            };
            match record {
                Some(record) => print_json(&record),
                None => bail!("Record {id} not found"),
            }
        }

        Commands::Delete { ids } => {
            let deleted = store.hot().delete_by_ids(&ids).await?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }

        Commands::DeleteMatching { filters } => {
            let filters = filters.into_filters();
            let deleted = store.hot().delete_matching(&filters).await?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }

        Commands::Compress { id } => {
            let record = store.compress_hot_record(id).await?;
            print_json(&record)
        }

        Commands::Summary { filters } => {
            let summary = store.hot().usage_summary(&filters.into_filters()).await?;
            print_json(&summary)
        }

        Commands::Stats => print_json(&store.stats().await?),

        Commands::Optimize => print_json(&store.optimize().await?),

        Commands::ConfigShow => print_json(&config),

        Commands::Daemon => run_daemon(store.clone(), config).await,
    }
}

async fn run_daemon(store: SqliteStore, config: Config) -> Result<()> {
    let handle = ConfigHandle::new(config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = MaintenanceScheduler::new(store, handle).spawn(shutdown_rx);

    info!(tasks = handles.len(), "maintenance daemon started, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    let _ = shutdown_tx.send(true);
    join_tasks(handles).await;
    Ok(())
}

/// Wait for every task, logging any that panicked. Returns how many did.
async fn join_tasks(handles: Vec<JoinHandle<()>>) -> usize {
    let mut failed = 0;
    for handle in handles {
        if let Err(error) = handle.await {
            tracing::error!(%error, "maintenance task panicked");
            failed += 1;
        }
    }
    failed
}
