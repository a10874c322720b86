//! Workspace discovery use case
//!
//! Asks the agent which workspaces the user can reach on a server and keeps
//! only those that can be used as a sync target.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    domain::{DomainError, Job, Workspace},
    ports::{AgentResult, IAgentApi, RemoteTarget, ServerCredentials},
};

/// Syncable workspaces plus the server's branding details
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceChoice {
    pub workspaces: Vec<Workspace>,
    pub application_title: Option<String>,
    pub user_display_name: Option<String>,
}

/// Use case for listing the workspaces a job could sync
pub struct ListWorkspacesUseCase {
    api: Arc<dyn IAgentApi>,
}

impl ListWorkspacesUseCase {
    pub fn new(api: Arc<dyn IAgentApi>) -> Self {
        Self { api }
    }

    /// Lists workspaces using the credentials typed into `job`.
    ///
    /// # Errors
    ///
    /// Fails with [`DomainError::MissingPassword`] without contacting the
    /// agent when no password was entered.
    pub async fn for_credentials(&self, job: &Job) -> AgentResult<WorkspaceChoice> {
        let has_password = job.password.as_deref().is_some_and(|p| !p.is_empty());
        if !has_password {
            warn!(server = %job.server, "Workspace lookup refused: no password");
            return Err(DomainError::MissingPassword.into());
        }
        self.fetch(RemoteTarget::Request(ServerCredentials::from_job(job)))
            .await
    }

    /// Lists workspaces with the credentials the agent stored for `job_id`.
    pub async fn for_job(&self, job_id: &str) -> AgentResult<WorkspaceChoice> {
        self.fetch(RemoteTarget::Job(job_id.to_string())).await
    }

    async fn fetch(&self, target: RemoteTarget) -> AgentResult<WorkspaceChoice> {
        let listing = self.api.list_workspaces(&target).await?;
        let workspaces = listing.syncable();
        debug!(
            total = listing.repositories.repo.len(),
            syncable = workspaces.len(),
            "Workspaces listed"
        );
        Ok(WorkspaceChoice {
            workspaces,
            application_title: listing.application_title,
            user_display_name: listing.user_display_name,
        })
    }
}
