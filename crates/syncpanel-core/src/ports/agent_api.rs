//! Sync agent port (driven/secondary port)
//!
//! Everything the panel knows comes from the agent's HTTP API. This module
//! defines the trait the rest of the workspace programs against, the
//! request DTOs it needs, and the error classification the poller relies
//! on to choose between the normal and the backoff delay.
//!
//! ## Design Notes
//!
//! - Unlike most ports this one returns a typed [`AgentError`]: callers must
//!   tell "agent unreachable" apart from "agent answered with an error".
//! - Uses `#[async_trait]` for async trait methods.

use std::fmt;

use thiserror::Error;

use crate::domain::{
    Conflict, DomainError, EndpointResolution, FolderNode, GeneralConfigs, Job, JobList,
    JobsById, LogsSnapshot, ProxySettings, ShareLink, ShareRequest, WorkspaceListing,
};

/// Message shown while the agent cannot be reached
pub const UNREACHABLE_MESSAGE: &str =
    "Ooops, cannot contact agent! Make sure it is running correctly, process will try to reconnect in 20s";

// ============================================================================
// AgentError
// ============================================================================

/// Errors returned by [`IAgentApi`] implementations
#[derive(Debug, Error)]
pub enum AgentError {
    /// No HTTP response was received (connection refused, timeout, DNS)
    #[error("{msg} ({0})", msg = UNREACHABLE_MESSAGE)]
    Unreachable(String),

    /// The agent answered with an error status
    #[error("Agent returned {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// `error` or `message` from the body, or the raw body
        message: String,
    },

    /// The agent answered with a body that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured agent URL or a request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request was refused locally before reaching the agent
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

impl AgentError {
    /// True when the agent could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, AgentError::Unreachable(_))
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            AgentError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias for agent calls
pub type AgentResult<T> = Result<T, AgentError>;

// ============================================================================
// Request DTOs
// ============================================================================

/// Commands accepted by `GET /cmd/:cmd/:job_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    Enable,
    Disable,
    Pause,
    Resume,
    Resync,
}

impl JobCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCommand::Enable => "enable",
            JobCommand::Disable => "disable",
            JobCommand::Pause => "pause",
            JobCommand::Resume => "resume",
            JobCommand::Resync => "resync",
        }
    }
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `POST /jobs` should treat the submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    /// Create (empty id) or update the job and restart it with fresh data
    Persist,
    /// Flip `active` without clearing the job's sync data
    ToggleStatus,
    /// Ask the agent for a default local directory for this workspace label
    SuggestDirectory {
        /// Label of the chosen workspace
        workspace_label: String,
    },
    /// Ask the agent to estimate the initial transfer size and duration
    ComputeSizes,
}

/// Server address and credentials typed into the job wizard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerCredentials {
    pub url: String,
    pub user: String,
    pub password: Option<String>,
    pub trust_ssl: bool,
}

impl ServerCredentials {
    /// Credentials carried by a job.
    pub fn from_job(job: &Job) -> Self {
        Self {
            url: job.server.clone(),
            user: job.user.clone(),
            password: job.password.clone(),
            trust_ssl: job.trust_ssl,
        }
    }
}

/// Whom the agent should contact for workspace and folder listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTarget {
    /// An existing job; the agent uses its stored credentials
    Job(String),
    /// Ad-hoc credentials (`/ws/request`, `/folders/request`)
    Request(ServerCredentials),
}

/// Parameters of a folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderQuery {
    pub target: RemoteTarget,
    /// Workspace slug; ignored for [`RemoteTarget::Job`]
    pub workspace: String,
    /// Sub-directory to list, `None` for the workspace root
    pub subdir: Option<String>,
}

/// Single-key filter for `GET /jobs/:job_id/logs?<key>=<value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub key: String,
    pub value: String,
}

// ============================================================================
// IAgentApi trait
// ============================================================================

/// Port trait for the sync agent's HTTP API
#[async_trait::async_trait]
pub trait IAgentApi: Send + Sync {
    /// `GET /jobs`: every job with its live status
    async fn list_jobs(&self) -> AgentResult<JobList>;

    /// `GET /jobs?with_id=true`: the persisted configuration keyed by id
    async fn jobs_by_id(&self) -> AgentResult<JobsById>;

    /// `GET /jobs/:job_id`
    async fn get_job(&self, job_id: &str) -> AgentResult<Job>;

    /// `POST /jobs`
    ///
    /// Returns the job as echoed by the agent; for
    /// [`SaveMode::SuggestDirectory`] and [`SaveMode::ComputeSizes`] the
    /// echo carries the suggestion and nothing is persisted.
    async fn save_job(&self, job: &Job, mode: SaveMode) -> AgentResult<Job>;

    /// `DELETE /jobs/:job_id`
    async fn delete_job(&self, job_id: &str) -> AgentResult<()>;

    /// `GET /jobs/:job_id/logs`
    async fn job_logs(&self, job_id: &str, filter: Option<&LogFilter>)
        -> AgentResult<LogsSnapshot>;

    /// `GET /jobs/:job_id/conflicts`
    async fn job_conflicts(&self, job_id: &str) -> AgentResult<Vec<Conflict>>;

    /// `POST /jobs/conflicts`; the record must carry its `job_id`
    async fn save_conflict(&self, conflict: &Conflict) -> AgentResult<()>;

    /// `GET /cmd/:cmd/:job_id`
    async fn send_command(&self, command: JobCommand, job_id: &str) -> AgentResult<()>;

    /// `GET /cmd/:cmd`: agent-wide commands
    async fn send_generic_command(&self, command: &str) -> AgentResult<serde_json::Value>;

    /// `GET /ws/:job_id`
    async fn list_workspaces(&self, target: &RemoteTarget) -> AgentResult<WorkspaceListing>;

    /// `GET /folders/:job_id`
    async fn list_folders(&self, query: &FolderQuery) -> AgentResult<Vec<FolderNode>>;

    /// `GET /resolve/:client_id`
    async fn resolve_client_id(&self, client_id: &str) -> AgentResult<EndpointResolution>;

    /// `GET /share/:job_id?action=share&checkExistingLinkFlag=true`
    async fn check_existing_share(&self, job_id: &str, relative_path: &str)
        -> AgentResult<ShareLink>;

    /// `GET /share/:job_id?action=share&...`
    async fn share(&self, job_id: &str, request: &ShareRequest) -> AgentResult<ShareLink>;

    /// `GET /share/:job_id?action=unshare&path=...`
    async fn unshare(&self, job_id: &str, path: &str) -> AgentResult<()>;

    /// `GET /general_configs`
    async fn general_configs(&self) -> AgentResult<GeneralConfigs>;

    /// `POST /general_configs`
    async fn update_general_configs(&self, configs: &GeneralConfigs)
        -> AgentResult<GeneralConfigs>;

    /// `GET /proxy`
    async fn proxy(&self) -> AgentResult<ProxySettings>;

    /// `POST /proxy`
    async fn update_proxy(&self, proxy: &ProxySettings) -> AgentResult<ProxySettings>;
}
