//! Job creation wizard
//!
//! A new job is built client side as a [`JobDraft`] carrying the
//! placeholder id `"new"`. The wizard walks through the connection details,
//! the workspace and the remote folder, asks the agent for a default local
//! directory and a size estimate, and finally saves the job, which is when
//! the agent assigns its real id.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::list_workspaces::ListWorkspacesUseCase;
use crate::{
    domain::{job::DRAFT_JOB_ID, Direction, DomainError, Job, Workspace},
    ports::{AgentResult, IAgentApi, SaveMode},
};

/// Label given to a draft before a workspace is chosen
pub const DEFAULT_DRAFT_LABEL: &str = "New Job";

/// Initial transfer estimate returned by the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferEstimate {
    /// Bytes to transfer in the first run
    pub byte_size: f64,
    /// Estimated seconds for the first run
    pub eta: f64,
}

/// A job being created
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub job: Job,
    /// Syncable workspaces found on the server
    pub repositories: Vec<Workspace>,
    pub application_title: Option<String>,
    pub user_display_name: Option<String>,
    pub estimate: Option<TransferEstimate>,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl JobDraft {
    pub fn new() -> Self {
        let job = Job {
            id: DRAFT_JOB_ID.to_string(),
            label: DEFAULT_DRAFT_LABEL.to_string(),
            direction: Direction::Bi,
            ..Default::default()
        };
        Self {
            job,
            repositories: Vec::new(),
            application_title: None,
            user_display_name: None,
            estimate: None,
        }
    }

    /// Stores the server address, defaulting to `https://` when no scheme is given.
    pub fn set_server(&mut self, input: &str) -> Result<(), DomainError> {
        self.job.server = normalize_server_url(input)?;
        Ok(())
    }

    pub fn set_credentials(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.job.user = user.into();
        self.job.password = Some(password.into());
    }

    /// Selects one of the discovered workspaces by slug.
    pub fn choose_workspace(&mut self, slug: &str) -> Result<&Workspace, DomainError> {
        let workspace = self
            .repositories
            .iter()
            .find(|w| w.slug.as_deref() == Some(slug))
            .ok_or_else(|| {
                DomainError::ValidationFailed(format!("workspace '{slug}' is not syncable"))
            })?;
        self.job.workspace = slug.to_string();
        self.job.label = derive_label(&self.job.remote_folder, &workspace.label);
        Ok(workspace)
    }

    /// Sets the remote folder and relabels the job after it.
    pub fn choose_remote_folder(&mut self, path: &str) {
        self.job.remote_folder = path.to_string();
        if let Some(workspace) = self.selected_workspace() {
            self.job.label = derive_label(path, &workspace.label);
        }
    }

    pub fn selected_workspace(&self) -> Option<&Workspace> {
        self.repositories
            .iter()
            .find(|w| w.slug.as_deref() == Some(self.job.workspace.as_str()))
    }
}

/// Label for a job syncing `remote_folder` of a workspace labelled `workspace_label`.
///
/// The folder's basename, or the workspace label for the workspace root.
pub fn derive_label(remote_folder: &str, workspace_label: &str) -> String {
    let trimmed = remote_folder.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => workspace_label.to_string(),
    }
}

/// Accepts `host`, `http://host` or `https://host`; a missing scheme means `https://`.
pub fn normalize_server_url(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidServerUrl("empty address".to_string()));
    }
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = url::Url::parse(&candidate)
        .map_err(|e| DomainError::InvalidServerUrl(format!("{trimmed}: {e}")))?;
    if parsed.host_str().is_none() {
        return Err(DomainError::InvalidServerUrl(trimmed.to_string()));
    }
    Ok(candidate.trim_end_matches('/').to_string())
}

/// The first existing job that syncs the same target as `candidate`.
pub fn find_duplicate<'a>(candidate: &Job, existing: &'a [Job]) -> Option<&'a Job> {
    existing.iter().find(|job| candidate.targets_same_as(job))
}

/// Use case driving the job wizard against the agent
pub struct CreateJobUseCase {
    api: Arc<dyn IAgentApi>,
    workspaces: ListWorkspacesUseCase,
}

impl CreateJobUseCase {
    pub fn new(api: Arc<dyn IAgentApi>) -> Self {
        Self {
            workspaces: ListWorkspacesUseCase::new(api.clone()),
            api,
        }
    }

    /// Fetches the syncable workspaces for the draft's credentials.
    ///
    /// Clears any previously chosen workspace.
    pub async fn load_workspaces(&self, draft: &mut JobDraft) -> AgentResult<()> {
        draft.job.workspace.clear();
        let choice = self.workspaces.for_credentials(&draft.job).await?;
        draft.repositories = choice.workspaces;
        if choice.application_title.is_some() {
            draft.application_title = choice.application_title;
        }
        if choice.user_display_name.is_some() {
            draft.user_display_name = choice.user_display_name;
        }
        Ok(())
    }

    /// Asks the agent where the job should live locally.
    pub async fn suggest_directory(&self, draft: &mut JobDraft) -> AgentResult<()> {
        let workspace_label = draft
            .selected_workspace()
            .map(|w| w.label.clone())
            .ok_or_else(|| DomainError::ValidationFailed("choose a workspace first".into()))?;
        let echoed = self
            .api
            .save_job(&draft.job, SaveMode::SuggestDirectory { workspace_label })
            .await?;
        debug!(directory = %echoed.directory, "Agent suggested a local directory");
        draft.job.directory = echoed.directory;
        Ok(())
    }

    /// Asks the agent how much data the first run will move.
    pub async fn estimate(&self, draft: &mut JobDraft) -> AgentResult<TransferEstimate> {
        let echoed = self.api.save_job(&draft.job, SaveMode::ComputeSizes).await?;
        let number = |key: &str| echoed.extra.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        let estimate = TransferEstimate {
            byte_size: number("byte_size"),
            eta: number("eta"),
        };
        draft.estimate = Some(estimate);
        Ok(estimate)
    }

    /// Saves the draft as a new job.
    ///
    /// # Errors
    ///
    /// Fails with [`DomainError::DuplicateJob`] without contacting the agent
    /// when an existing job already syncs the same target.
    pub async fn create(&self, draft: &JobDraft, existing: &[Job]) -> AgentResult<Job> {
        if draft.job.directory.is_empty() {
            return Err(DomainError::ValidationFailed("a local directory is required".into()).into());
        }
        if let Some(dup) = find_duplicate(&draft.job, existing) {
            return Err(DomainError::DuplicateJob {
                existing_id: dup.id.clone(),
            }
            .into());
        }

        let mut job = draft.job.clone();
        job.id.clear();
        let saved = self.api.save_job(&job, SaveMode::Persist).await?;
        info!(job_id = %saved.id, label = %saved.label, "Job created");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::WorkspaceListing,
        ports::AgentError,
        testing::StubAgent,
    };

    fn listing() -> WorkspaceListing {
        serde_json::from_value(json!({
            "application_title": "Acme Files",
            "repositories": {"repo": [
                {"@repositorySlug": "my-files", "label": "My Files", "@meta_syncable_REPO_SYNCABLE": "true"},
                {"@repositorySlug": "common", "label": "Common", "@meta_syncable_REPO_SYNCABLE": "true"}
            ]}
        }))
        .unwrap()
    }

    fn ready_draft() -> JobDraft {
        let mut draft = JobDraft::new();
        draft.set_server("files.example.com").unwrap();
        draft.set_credentials("alice", "pw");
        draft.repositories = listing().syncable();
        draft.choose_workspace("my-files").unwrap();
        draft.job.directory = "/home/alice/My Files".into();
        draft
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = JobDraft::new();
        assert_eq!(draft.job.id, "new");
        assert_eq!(draft.job.label, "New Job");
        assert_eq!(draft.job.direction, Direction::Bi);
        assert!(draft.job.is_draft());
        assert!(draft.job.remote_folder.is_empty());
    }

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(
            normalize_server_url("files.example.com").unwrap(),
            "https://files.example.com"
        );
        assert_eq!(
            normalize_server_url("http://10.0.0.5:8080/").unwrap(),
            "http://10.0.0.5:8080"
        );
        assert!(normalize_server_url("   ").is_err());
    }

    #[test]
    fn test_derive_label() {
        assert_eq!(derive_label("/projects/2024", "My Files"), "2024");
        assert_eq!(derive_label("/projects/", "My Files"), "projects");
        assert_eq!(derive_label("/", "My Files"), "My Files");
        assert_eq!(derive_label("", "My Files"), "My Files");
    }

    #[test]
    fn test_choose_folder_relabels() {
        let mut draft = ready_draft();
        assert_eq!(draft.job.label, "My Files");
        draft.choose_remote_folder("/photos");
        assert_eq!(draft.job.label, "photos");
        assert!(draft.choose_workspace("unknown").is_err());
    }

    #[test]
    fn test_find_duplicate() {
        let draft = ready_draft();
        let mut existing = draft.job.clone();
        existing.id = "job-7".into();
        existing.server.push('/');

        let found = find_duplicate(&draft.job, std::slice::from_ref(&existing));
        assert_eq!(found.map(|j| j.id.as_str()), Some("job-7"));
    }

    #[tokio::test]
    async fn test_load_workspaces_copies_branding() {
        let stub = Arc::new(StubAgent::with(|s| s.workspaces = listing()));
        let usecase = CreateJobUseCase::new(stub.clone());
        let mut draft = JobDraft::new();
        draft.set_server("files.example.com").unwrap();
        draft.set_credentials("alice", "pw");
        draft.job.workspace = "stale".into();

        usecase.load_workspaces(&mut draft).await.unwrap();

        assert_eq!(draft.repositories.len(), 2);
        assert_eq!(draft.application_title.as_deref(), Some("Acme Files"));
        assert!(draft.job.workspace.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_directory_and_estimate() {
        let stub = Arc::new(StubAgent::new());
        let usecase = CreateJobUseCase::new(stub.clone());
        let mut draft = ready_draft();

        usecase.suggest_directory(&mut draft).await.unwrap();
        assert_eq!(draft.job.directory, "/home/user/Sync/My Files");

        let estimate = usecase.estimate(&mut draft).await.unwrap();
        assert_eq!(estimate.byte_size, 1048576.0);
        assert_eq!(draft.estimate, Some(estimate));
        assert!(stub.state().jobs.is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let stub = Arc::new(StubAgent::new());
        let usecase = CreateJobUseCase::new(stub.clone());

        let saved = usecase.create(&ready_draft(), &[]).await.unwrap();

        assert_eq!(saved.id, "job-1");
        let (sent, mode) = stub.state().saved_jobs[0].clone();
        assert!(sent.id.is_empty());
        assert_eq!(mode, SaveMode::Persist);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let stub = Arc::new(StubAgent::new());
        let usecase = CreateJobUseCase::new(stub.clone());
        let draft = ready_draft();
        let mut existing = draft.job.clone();
        existing.id = "job-3".into();

        let err = usecase.create(&draft, &[existing]).await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::Rejected(DomainError::DuplicateJob { ref existing_id }) if existing_id == "job-3"
        ));
        assert!(stub.calls().is_empty());
    }
}
