pub mod scheduler;
pub mod tasks;

pub use scheduler::MaintenanceScheduler;
pub use tasks::{MaintenanceTask, TaskOutcome, run_task};
