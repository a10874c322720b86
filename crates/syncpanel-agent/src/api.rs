//! `IAgentApi` implementation for [`AgentClient`]
//!
//! One method per agent resource. Request shapes follow the agent's routes:
//! path parameters are single encoded segments, ad-hoc credentials travel as
//! query parameters, and job saves carry a mode flag in the JSON body.

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use syncpanel_core::domain::{
    Conflict, DomainError, EndpointResolution, FolderListing, FolderNode, GeneralConfigs, Job,
    JobList, JobsById, LogsSnapshot, ProxySettings, ShareLink, ShareRequest, WorkspaceListing,
};
use syncpanel_core::ports::{
    AgentError, AgentResult, FolderQuery, IAgentApi, JobCommand, LogFilter, RemoteTarget,
    SaveMode, ServerCredentials,
};

use crate::client::{decode, AgentClient};

// ============================================================================
// Request helpers
// ============================================================================

/// Query parameters for `/ws/request` and `/folders/request`
fn credential_pairs(creds: &ServerCredentials) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("url", creds.url.clone()),
        ("user", creds.user.clone()),
        ("trust_ssl", creds.trust_ssl.to_string()),
    ];
    if let Some(password) = &creds.password {
        pairs.push(("password", password.clone()));
    }
    pairs
}

/// Body keys that switch `POST /jobs` away from a plain save
const MODE_FLAGS: &[&str] = &["toggle_status", "test_path", "repoObject", "compute_sizes"];

/// JSON body of `POST /jobs` for the given mode.
///
/// Flags echoed back by an earlier request are dropped first.
fn save_body(job: &Job, mode: &SaveMode) -> AgentResult<Value> {
    let mut body = match serde_json::to_value(job) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(AgentError::InvalidResponse(e.to_string())),
    };
    for flag in MODE_FLAGS {
        body.remove(*flag);
    }
    match mode {
        SaveMode::Persist => {}
        SaveMode::ToggleStatus => {
            body.insert("toggle_status".into(), Value::Bool(true));
        }
        SaveMode::SuggestDirectory { workspace_label } => {
            body.insert("test_path".into(), Value::Bool(true));
            body.insert("repoObject".into(), json!({ "label": workspace_label }));
        }
        SaveMode::ComputeSizes => {
            body.insert("compute_sizes".into(), Value::Bool(true));
        }
    }
    Ok(Value::Object(body))
}

/// `GET /jobs/:id` answers with either the job or `[job, marker]`.
fn single_job(value: Value) -> AgentResult<Job> {
    match value {
        Value::Array(items) => {
            let list =
                JobList::from_values(items).map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
            list.jobs
                .into_iter()
                .next()
                .ok_or_else(|| AgentError::InvalidResponse("empty job listing".to_string()))
        }
        other => decode(other),
    }
}

// ============================================================================
// IAgentApi
// ============================================================================

#[async_trait::async_trait]
impl IAgentApi for AgentClient {
    async fn list_jobs(&self) -> AgentResult<JobList> {
        let values: Vec<Value> = self.json(self.request(Method::GET, &["jobs"])?).await?;
        let list =
            JobList::from_values(values).map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        debug!(jobs = list.jobs.len(), internet_ok = ?list.internet_ok, "Listed jobs");
        Ok(list)
    }

    async fn jobs_by_id(&self) -> AgentResult<JobsById> {
        let builder = self
            .request(Method::GET, &["jobs"])?
            .query(&[("with_id", "true")]);
        let mut jobs: JobsById = self.json(builder).await?;
        for (id, job) in jobs.iter_mut() {
            if job.id.is_empty() {
                job.id = id.clone();
            }
        }
        Ok(jobs)
    }

    async fn get_job(&self, job_id: &str) -> AgentResult<Job> {
        let value = self
            .json_value(self.request(Method::GET, &["jobs", job_id])?)
            .await?;
        single_job(value)
    }

    async fn save_job(&self, job: &Job, mode: SaveMode) -> AgentResult<Job> {
        let body = save_body(job, &mode)?;
        let builder = self.request(Method::POST, &["jobs"])?.json(&body);
        let saved: Job = self.json(builder).await?;
        if mode == SaveMode::Persist || mode == SaveMode::ToggleStatus {
            info!(job_id = %saved.id, ?mode, "Saved job");
        }
        Ok(saved)
    }

    async fn delete_job(&self, job_id: &str) -> AgentResult<()> {
        self.execute(self.request(Method::DELETE, &["jobs", job_id])?)
            .await?;
        info!(job_id, "Deleted job");
        Ok(())
    }

    async fn job_logs(
        &self,
        job_id: &str,
        filter: Option<&LogFilter>,
    ) -> AgentResult<LogsSnapshot> {
        let mut builder = self.request(Method::GET, &["jobs", job_id, "logs"])?;
        if let Some(filter) = filter {
            builder = builder.query(&[(filter.key.as_str(), filter.value.as_str())]);
        }
        self.json(builder).await
    }

    async fn job_conflicts(&self, job_id: &str) -> AgentResult<Vec<Conflict>> {
        self.json(self.request(Method::GET, &["jobs", job_id, "conflicts"])?)
            .await
    }

    async fn save_conflict(&self, conflict: &Conflict) -> AgentResult<()> {
        if conflict.job_id.as_deref().unwrap_or_default().is_empty() {
            return Err(DomainError::ValidationFailed(
                "conflict record has no job_id".to_string(),
            )
            .into());
        }
        let builder = self
            .request(Method::POST, &["jobs", "conflicts"])?
            .json(conflict);
        self.execute(builder).await?;
        debug!(node_id = %conflict.node_id, status = %conflict.status, "Saved conflict");
        Ok(())
    }

    async fn send_command(&self, command: JobCommand, job_id: &str) -> AgentResult<()> {
        self.execute(self.request(Method::GET, &["cmd", command.as_str(), job_id])?)
            .await?;
        info!(%command, job_id, "Sent command");
        Ok(())
    }

    async fn send_generic_command(&self, command: &str) -> AgentResult<Value> {
        self.json_value(self.request(Method::GET, &["cmd", command])?)
            .await
    }

    async fn list_workspaces(&self, target: &RemoteTarget) -> AgentResult<WorkspaceListing> {
        let builder = match target {
            RemoteTarget::Job(job_id) => self.request(Method::GET, &["ws", job_id.as_str()])?,
            RemoteTarget::Request(creds) => self
                .request(Method::GET, &["ws", "request"])?
                .query(&credential_pairs(creds)),
        };
        self.json(builder).await
    }

    async fn list_folders(&self, query: &FolderQuery) -> AgentResult<Vec<FolderNode>> {
        let mut builder = match &query.target {
            RemoteTarget::Job(job_id) => self.request(Method::GET, &["folders", job_id.as_str()])?,
            RemoteTarget::Request(creds) => self
                .request(Method::GET, &["folders", "request"])?
                .query(&credential_pairs(creds))
                .query(&[("ws", query.workspace.as_str())]),
        };
        if let Some(subdir) = &query.subdir {
            builder = builder.query(&[("subdir", subdir.as_str())]);
        }

        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        let listing: FolderListing = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        match listing {
            FolderListing::Nodes(nodes) => Ok(nodes),
            FolderListing::Error([err]) => Err(AgentError::Server {
                status,
                message: err.error,
            }),
        }
    }

    async fn resolve_client_id(&self, client_id: &str) -> AgentResult<EndpointResolution> {
        self.json(self.request(Method::GET, &["resolve", client_id])?)
            .await
    }

    async fn check_existing_share(
        &self,
        job_id: &str,
        relative_path: &str,
    ) -> AgentResult<ShareLink> {
        let builder = self.request(Method::GET, &["share", job_id])?.query(&[
            ("action", "share"),
            ("relative_path", relative_path),
            ("checkExistingLinkFlag", "true"),
        ]);
        self.json(builder).await
    }

    async fn share(&self, job_id: &str, request: &ShareRequest) -> AgentResult<ShareLink> {
        let builder = self
            .request(Method::GET, &["share", job_id])?
            .query(&request.query_pairs());
        let link: ShareLink = self.json(builder).await?;
        info!(job_id, path = %request.relative_path, "Created share link");
        Ok(link)
    }

    async fn unshare(&self, job_id: &str, path: &str) -> AgentResult<()> {
        let builder = self
            .request(Method::GET, &["share", job_id])?
            .query(&[("action", "unshare"), ("path", path)]);
        self.execute(builder).await?;
        info!(job_id, path, "Removed share link");
        Ok(())
    }

    async fn general_configs(&self) -> AgentResult<GeneralConfigs> {
        let configs: GeneralConfigs = self
            .json(self.request(Method::GET, &["general_configs"])?)
            .await?;
        Ok(configs.normalize())
    }

    async fn update_general_configs(
        &self,
        configs: &GeneralConfigs,
    ) -> AgentResult<GeneralConfigs> {
        let builder = self
            .request(Method::POST, &["general_configs"])?
            .json(configs);
        let updated: GeneralConfigs = self.json(builder).await?;
        Ok(updated.normalize())
    }

    async fn proxy(&self) -> AgentResult<ProxySettings> {
        self.json(self.request(Method::GET, &["proxy"])?).await
    }

    async fn update_proxy(&self, proxy: &ProxySettings) -> AgentResult<ProxySettings> {
        self.json(self.request(Method::POST, &["proxy"])?.json(proxy))
            .await
    }
}
