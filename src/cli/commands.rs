use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tierlog::store::QueryFilters;

/// `tierlog` - tiered conversation log store.
#[derive(Parser, Debug)]
#[command(name = "tierlog")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Archive, purge and query a tiered conversation log.", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (overrides config and TIERLOG_DATABASE)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move aged records from the hot table into the archive
    Migrate {
        /// Archive records older than this many days (default: archive.archive_after_days)
        #[arg(long)]
        days: Option<u32>,

        /// Records per batch (default: archive.batch_size)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Permanently delete expired archive records
    Purge {
        /// Delete archived records older than this many days (default: retention.purge_after_days)
        #[arg(long)]
        days: Option<u32>,

        /// Records per batch (default: retention.batch_size)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Page through records, newest first
    Query {
        #[command(flatten)]
        filters: FilterArgs,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: i64,

        /// Records per page (0 = configured default)
        #[arg(long, default_value = "0")]
        page_size: i64,

        /// Include archived records
        #[arg(long)]
        include_archive: bool,
    },

    /// Show a single hot record
    Get {
        id: i64,

        /// Read from the compressed table instead
        #[arg(long)]
        compressed: bool,
    },

    /// Delete hot records by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete hot records matching filters (at least one filter required)
    DeleteMatching {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Move one hot record into the compressed table
    Compress { id: i64 },

    /// Token usage totals for hot records
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Row counts, age range and table sizes
    Stats,

    /// Rebuild statistics and reclaim free space
    Optimize,

    /// Print the effective configuration
    ConfigShow,

    /// Run the maintenance scheduler until Ctrl-C
    Daemon,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Exact user id
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Model name substring
    #[arg(long)]
    pub model: Option<String>,

    /// Exact username
    #[arg(long)]
    pub username: Option<String>,

    /// Earliest created_at, epoch seconds (inclusive)
    #[arg(long)]
    pub start_time: Option<i64>,

    /// Latest created_at, epoch seconds (inclusive)
    #[arg(long)]
    pub end_time: Option<i64>,
}

impl FilterArgs {
    pub fn into_filters(self) -> QueryFilters {
        QueryFilters {
            user_id: self.user_id,
            model_name: self.model,
            username: self.username,
            start_time: self.start_time,
            end_time: self.end_time,
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_flags_parse() {
        let cli = Cli::try_parse_from([
            "tierlog",
            "query",
            "--user-id",
            "7",
            "--model",
            "gpt",
            "--page",
            "2",
            "--include-archive",
        ])
        .unwrap();
        match cli.command {
            Commands::Query {
                filters,
                page,
                page_size,
                include_archive,
            } => {
                assert_eq!(page, 2);
                assert_eq!(page_size, 0);
                assert!(include_archive);
                let filters = filters.into_filters();
                assert_eq!(filters.user_id, Some(7));
                assert_eq!(filters.model_name.as_deref(), Some("gpt"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli =
            Cli::try_parse_from(["tierlog", "stats", "--verbose", "--database", "/tmp/x.db"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn delete_requires_ids() {
        assert!(Cli::try_parse_from(["tierlog", "delete"]).is_err());
    }
}
