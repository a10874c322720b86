//! Domain entities
//!
//! Types exchanged with the sync agent and the pure rules that operate on
//! them:
//! - Jobs, their progress snapshots and the editable subset of their fields
//! - Log entries and running-task snapshots
//! - Conflicts and batch resolution
//! - Remote folder nodes, workspaces and endpoint resolution
//! - Share links and agent-wide settings
//! - Domain-specific error types

pub mod conflict;
pub mod errors;
pub mod folder;
pub mod job;
pub mod log;
pub mod progress;
pub mod settings;
pub mod share;
pub mod wire;
pub mod workspace;

// Re-export commonly used types
pub use conflict::{Conflict, ConflictSet, ConflictSide, ConflictStatus, ResolveTarget};
pub use errors::DomainError;
pub use folder::{FolderListing, FolderNode};
pub use job::{Direction, EditableFields, Job, JobFilters, JobList, JobsById, SolvePolicy, StartTime};
pub use log::{LogEntry, LogsSnapshot};
pub use progress::{GlobalProgress, JobState, RunningState, TaskProgress, TaskSet};
pub use settings::{GeneralConfigs, ProxySettings};
pub use share::{ShareLink, ShareRequest};
pub use workspace::{Endpoint, EndpointResolution, Workspace, WorkspaceListing};
