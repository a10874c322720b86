//! Existing-job management use case
//!
//! Editing, reverting, saving, deleting and commanding a job that the agent
//! already knows about.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    domain::{DomainError, Job, JobList},
    ports::{AgentResult, IAgentApi, JobCommand, SaveMode},
};

/// True when any user-editable field of `edited` differs from `reference`.
pub fn is_modified(edited: &Job, reference: &Job) -> bool {
    edited.editable() != reference.editable()
}

/// Use case for operations on a saved job
pub struct ManageJobUseCase {
    api: Arc<dyn IAgentApi>,
}

impl ManageJobUseCase {
    pub fn new(api: Arc<dyn IAgentApi>) -> Self {
        Self { api }
    }

    /// Restores the editable fields of `job` from the agent's stored configuration.
    pub async fn revert(&self, job: &mut Job) -> AgentResult<()> {
        let stored = self.api.jobs_by_id().await?;
        let original = stored.get(&job.id).ok_or_else(|| {
            DomainError::ValidationFailed(format!("job '{}' is not known to the agent", job.id))
        })?;
        job.apply_editable(original.editable());
        debug!(job_id = %job.id, "Reverted job edits");
        Ok(())
    }

    /// Persists `job`. The agent restarts it with fresh sync data.
    pub async fn save(&self, job: &Job) -> AgentResult<Job> {
        let saved = self.api.save_job(job, SaveMode::Persist).await?;
        info!(job_id = %saved.id, "Job saved");
        Ok(saved)
    }

    /// Flips `active` and saves without clearing the job's sync data.
    pub async fn toggle_active(&self, job: &mut Job) -> AgentResult<Job> {
        job.active = !job.active;
        let saved = self.api.save_job(job, SaveMode::ToggleStatus).await?;
        info!(job_id = %saved.id, active = saved.active, "Job toggled");
        Ok(saved)
    }

    pub async fn delete(&self, job_id: &str) -> AgentResult<()> {
        self.api.delete_job(job_id).await?;
        info!(job_id = %job_id, "Job deleted");
        Ok(())
    }

    /// Sends `command` to a job, then returns the refreshed job list.
    pub async fn apply_command(&self, command: JobCommand, job_id: &str) -> AgentResult<JobList> {
        self.api.send_command(command, job_id).await?;
        info!(job_id = %job_id, command = %command, "Command sent");
        self.api.list_jobs().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubAgent;

    fn stored_job() -> Job {
        Job {
            id: "job-1".into(),
            label: "Work".into(),
            server: "https://files.example.com".into(),
            user: "alice".into(),
            directory: "/home/alice/Work".into(),
            workspace: "my-files".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_modified_only_looks_at_editable_fields() {
        let reference = stored_job();
        let mut edited = reference.clone();
        edited.running = true;
        edited.remote_folder = "/elsewhere".into();
        assert!(!is_modified(&edited, &reference));

        edited.timeout = 60;
        assert!(is_modified(&edited, &reference));
    }

    #[tokio::test]
    async fn test_revert_restores_stored_values() {
        let stub = Arc::new(StubAgent::with(|s| s.jobs = vec![stored_job()]));
        let usecase = ManageJobUseCase::new(stub.clone());

        let mut edited = stored_job();
        edited.label = "Scratch".into();
        edited.poolsize = 16;
        usecase.revert(&mut edited).await.unwrap();

        assert_eq!(edited.label, "Work");
        assert_eq!(edited.poolsize, 4);
        assert!(!is_modified(&edited, &stored_job()));
    }

    #[tokio::test]
    async fn test_revert_unknown_job_fails() {
        let stub = Arc::new(StubAgent::new());
        let usecase = ManageJobUseCase::new(stub);
        let mut job = stored_job();
        assert!(usecase.revert(&mut job).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_command_refreshes_jobs() {
        let stub = Arc::new(StubAgent::with(|s| s.jobs = vec![stored_job()]));
        let usecase = ManageJobUseCase::new(stub.clone());

        let list = usecase.apply_command(JobCommand::Pause, "job-1").await.unwrap();

        assert_eq!(list.jobs.len(), 1);
        assert_eq!(stub.calls(), vec!["cmd:pause:job-1", "list_jobs"]);
    }

    #[tokio::test]
    async fn test_toggle_active_uses_toggle_mode() {
        let stub = Arc::new(StubAgent::with(|s| s.jobs = vec![stored_job()]));
        let usecase = ManageJobUseCase::new(stub.clone());
        let mut job = stored_job();

        let saved = usecase.toggle_active(&mut job).await.unwrap();

        assert!(!saved.active);
        assert_eq!(stub.state().saved_jobs[0].1, SaveMode::ToggleStatus);
    }

    #[tokio::test]
    async fn test_delete() {
        let stub = Arc::new(StubAgent::with(|s| s.jobs = vec![stored_job()]));
        let usecase = ManageJobUseCase::new(stub.clone());
        usecase.delete("job-1").await.unwrap();
        assert!(stub.state().jobs.is_empty());
    }
}
