//! Use cases (interactors) for syncpanel
//!
//! Thin coordinators over the [`IAgentApi`](crate::ports::IAgentApi) port.
//! Local validation happens here, before any request is issued.
//!
//! ## Use Cases
//!
//! - [`CreateJobUseCase`] - Job wizard: workspaces, directory suggestion, estimate, save
//! - [`ListWorkspacesUseCase`] - Syncable workspace discovery
//! - [`ManageJobUseCase`] - Revert, save, toggle, delete and command a saved job
//! - [`ResolveConflictsUseCase`] - Record conflict resolutions
//! - [`ResolveEndpointUseCase`] - Resolve a client id to a server URL

pub mod create_job;
pub mod list_workspaces;
pub mod manage_job;
pub mod resolve_conflicts;
pub mod resolve_endpoint;

pub use create_job::{CreateJobUseCase, JobDraft, TransferEstimate};
pub use list_workspaces::{ListWorkspacesUseCase, WorkspaceChoice};
pub use manage_job::{is_modified, ManageJobUseCase};
pub use resolve_conflicts::ResolveConflictsUseCase;
pub use resolve_endpoint::ResolveEndpointUseCase;
