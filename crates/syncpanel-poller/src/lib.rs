//! Syncpanel Poller - Keeps view state in step with the agent
//!
//! Provides:
//! - A cancellable fetch → wait → fetch loop with a normal and a backoff delay
//! - Field-level reconciliation of jobs, logs and conflicts that never
//!   clobbers the job being edited
//! - A dashboard session running the three streams against shared state
//!
//! ## Modules
//!
//! - [`poller`] - The repeating fetch loop and its schedule
//! - [`reconcile`] - Pure merge rules for each view
//! - [`dashboard`] - Jobs, logs and conflicts streams for one selected job
//! - [`completion`] - Watches a freshly created job until its first run drains

pub mod completion;
pub mod dashboard;
pub mod poller;
pub mod reconcile;

pub use completion::watch_until_drained;
pub use dashboard::{Dashboard, DashboardState};
pub use poller::{PollHandle, PollSchedule, Poller};
pub use reconcile::{reconcile_jobs, ConflictsView, JobsView, LogsView};
