//! In-memory [`IAgentApi`] for tests
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for the dev-dependencies of the other workspace crates.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
};

use serde_json::{json, Value};

use crate::{
    domain::{
        Conflict, EndpointResolution, FolderNode, GeneralConfigs, Job, JobList, JobsById,
        LogsSnapshot, ProxySettings, ShareLink, ShareRequest, WorkspaceListing,
    },
    ports::{
        AgentError, AgentResult, FolderQuery, IAgentApi, JobCommand, LogFilter, RemoteTarget,
        SaveMode,
    },
};

/// Canned agent state plus a record of every call
#[derive(Debug, Default)]
pub struct StubState {
    pub jobs: Vec<Job>,
    pub logs: HashMap<String, LogsSnapshot>,
    pub conflicts: HashMap<String, Vec<Conflict>>,
    /// Folder listings keyed by sub-directory; `""` is the workspace root
    pub folders: HashMap<String, Vec<FolderNode>>,
    pub workspaces: WorkspaceListing,
    pub endpoints: EndpointResolution,
    pub general: GeneralConfigs,
    pub proxy: ProxySettings,
    pub share_link: ShareLink,
    /// Errors returned, in order, by the next calls
    pub failures: VecDeque<AgentError>,
    /// One entry per call, e.g. `list_jobs` or `job_logs:job-1`
    pub calls: Vec<String>,
    pub saved_jobs: Vec<(Job, SaveMode)>,
    pub saved_conflicts: Vec<Conflict>,
    pub commands: Vec<(JobCommand, String)>,
}

/// Thread-safe stub implementing [`IAgentApi`]
#[derive(Debug, Default)]
pub struct StubAgent {
    state: Mutex<StubState>,
}

impl StubAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stub whose state is prepared by `setup`.
    pub fn with(setup: impl FnOnce(&mut StubState)) -> Self {
        let stub = Self::default();
        setup(&mut stub.state());
        stub
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: AgentError) {
        self.state().failures.push_back(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn enter(&self, call: impl Into<String>) -> AgentResult<MutexGuard<'_, StubState>> {
        let mut state = self.state();
        state.calls.push(call.into());
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str) -> AgentError {
    AgentError::Server {
        status: 404,
        message: format!("Can't find any job config with this ID: {what}"),
    }
}

#[async_trait::async_trait]
impl IAgentApi for StubAgent {
    async fn list_jobs(&self) -> AgentResult<JobList> {
        let state = self.enter("list_jobs")?;
        Ok(JobList {
            jobs: state.jobs.clone(),
            internet_ok: Some(true),
        })
    }

    async fn jobs_by_id(&self) -> AgentResult<JobsById> {
        let state = self.enter("jobs_by_id")?;
        Ok(state
            .jobs
            .iter()
            .map(|job| (job.id.clone(), job.clone()))
            .collect())
    }

    async fn get_job(&self, job_id: &str) -> AgentResult<Job> {
        let state = self.enter(format!("get_job:{job_id}"))?;
        state
            .jobs
            .iter()
            .find(|job| job.id == job_id)
            .cloned()
            .ok_or_else(|| not_found(job_id))
    }

    async fn save_job(&self, job: &Job, mode: SaveMode) -> AgentResult<Job> {
        let mut state = self.enter("save_job")?;
        state.saved_jobs.push((job.clone(), mode.clone()));
        let mut echoed = job.clone();
        match mode {
            SaveMode::SuggestDirectory { workspace_label } => {
                echoed.directory = format!("/home/user/Sync/{workspace_label}");
            }
            SaveMode::ComputeSizes => {
                echoed.extra.insert("byte_size".into(), json!(1048576.0));
                echoed.extra.insert("eta".into(), json!(42.0));
            }
            SaveMode::Persist | SaveMode::ToggleStatus => {
                if echoed.is_draft() {
                    echoed.id = format!("job-{}", state.jobs.len() + 1);
                }
                echoed.password = None;
                match state.jobs.iter_mut().find(|j| j.id == echoed.id) {
                    Some(existing) => *existing = echoed.clone(),
                    None => state.jobs.push(echoed.clone()),
                }
            }
        }
        Ok(echoed)
    }

    async fn delete_job(&self, job_id: &str) -> AgentResult<()> {
        let mut state = self.enter(format!("delete_job:{job_id}"))?;
        state.jobs.retain(|job| job.id != job_id);
        Ok(())
    }

    async fn job_logs(
        &self,
        job_id: &str,
        _filter: Option<&LogFilter>,
    ) -> AgentResult<LogsSnapshot> {
        let state = self.enter(format!("job_logs:{job_id}"))?;
        state
            .logs
            .get(job_id)
            .cloned()
            .ok_or_else(|| not_found(job_id))
    }

    async fn job_conflicts(&self, job_id: &str) -> AgentResult<Vec<Conflict>> {
        let state = self.enter(format!("job_conflicts:{job_id}"))?;
        Ok(state.conflicts.get(job_id).cloned().unwrap_or_default())
    }

    async fn save_conflict(&self, conflict: &Conflict) -> AgentResult<()> {
        let mut state = self.enter(format!("save_conflict:{}", conflict.node_id))?;
        state.saved_conflicts.push(conflict.clone());
        Ok(())
    }

    async fn send_command(&self, command: JobCommand, job_id: &str) -> AgentResult<()> {
        let mut state = self.enter(format!("cmd:{command}:{job_id}"))?;
        state.commands.push((command, job_id.to_string()));
        Ok(())
    }

    async fn send_generic_command(&self, command: &str) -> AgentResult<Value> {
        self.enter(format!("cmd:{command}"))?;
        Ok(json!(["success"]))
    }

    async fn list_workspaces(&self, target: &RemoteTarget) -> AgentResult<WorkspaceListing> {
        let label = match target {
            RemoteTarget::Job(id) => id.clone(),
            RemoteTarget::Request(creds) => creds.url.clone(),
        };
        let state = self.enter(format!("list_workspaces:{label}"))?;
        Ok(state.workspaces.clone())
    }

    async fn list_folders(&self, query: &FolderQuery) -> AgentResult<Vec<FolderNode>> {
        let subdir = query.subdir.clone().unwrap_or_default();
        let state = self.enter(format!("list_folders:{subdir}"))?;
        Ok(state.folders.get(&subdir).cloned().unwrap_or_default())
    }

    async fn resolve_client_id(&self, client_id: &str) -> AgentResult<EndpointResolution> {
        let state = self.enter(format!("resolve:{client_id}"))?;
        Ok(state.endpoints.clone())
    }

    async fn check_existing_share(
        &self,
        job_id: &str,
        relative_path: &str,
    ) -> AgentResult<ShareLink> {
        let state = self.enter(format!("share_check:{job_id}:{relative_path}"))?;
        Ok(state.share_link.clone())
    }

    async fn share(&self, job_id: &str, request: &ShareRequest) -> AgentResult<ShareLink> {
        let state = self.enter(format!("share:{job_id}:{}", request.relative_path))?;
        Ok(state.share_link.clone())
    }

    async fn unshare(&self, job_id: &str, path: &str) -> AgentResult<()> {
        self.enter(format!("unshare:{job_id}:{path}"))?;
        Ok(())
    }

    async fn general_configs(&self) -> AgentResult<GeneralConfigs> {
        let state = self.enter("general_configs")?;
        Ok(state.general.clone())
    }

    async fn update_general_configs(&self, configs: &GeneralConfigs) -> AgentResult<GeneralConfigs> {
        let mut state = self.enter("update_general_configs")?;
        state.general = configs.clone();
        Ok(configs.clone())
    }

    async fn proxy(&self) -> AgentResult<ProxySettings> {
        let state = self.enter("proxy")?;
        Ok(state.proxy.clone())
    }

    async fn update_proxy(&self, proxy: &ProxySettings) -> AgentResult<ProxySettings> {
        let mut state = self.enter("update_proxy")?;
        state.proxy = proxy.clone();
        Ok(proxy.clone())
    }
}
