//! Domain error types
//!
//! Local validation failures. These block the attempted action before any
//! request reaches the agent.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Workspace discovery needs the user's password
    #[error("You must provide your password.")]
    MissingPassword,

    /// Another job already syncs the same remote folder into the same directory
    #[error("A job with the same server, workspace, remote folder and directory already exists: {existing_id}")]
    DuplicateJob {
        /// Id of the job that already covers this target
        existing_id: String,
    },

    /// Client id resolution was attempted with an empty id
    #[error("Null Client ID")]
    EmptyClientId,

    /// The server address could not be understood
    #[error("Invalid server URL: {0}")]
    InvalidServerUrl(String),

    /// A conflict status string is not `UNSOLVED` or `SOLVED:<POLICY>`
    #[error("Invalid conflict status: {0}")]
    InvalidConflictStatus(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
