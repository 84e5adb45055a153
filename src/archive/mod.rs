//! Background archival and retention.
//!
//! Both tasks run as a sequence of bounded batches, each committed before the
//! next one starts. A run stops when a batch comes back short, when the
//! shutdown signal is raised, or on the first storage failure.

pub mod batch;
pub mod migrator;
pub mod reaper;
pub mod two_phase;

pub use batch::{BatchRunReport, DEFAULT_THROTTLE, never_cancelled};
pub use migrator::{ArchiveMigrator, cutoff_from_days};
pub use reaper::RetentionReaper;
pub use two_phase::TwoPhaseMover;
