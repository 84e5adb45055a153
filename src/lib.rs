#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod archive;
pub mod compression;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod query;
pub mod recorder;
pub mod store;

pub use archive::{ArchiveMigrator, BatchRunReport, RetentionReaper, TwoPhaseMover};
pub use config::{Config, ConfigHandle};
pub use error::{Result, TierlogError};
pub use query::{QueryPage, UnifiedQuery};
pub use recorder::ConversationRecorder;
pub use store::{QueryFilters, SqliteStore};
