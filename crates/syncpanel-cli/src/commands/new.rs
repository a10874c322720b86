//! New command - Create a sync job
//!
//! Provides the `syncpanel new` CLI command which walks the job wizard:
//! 1. Connects to the server and lists its syncable workspaces
//! 2. Picks the workspace and the remote folder to sync
//! 3. Asks the agent for a local directory and a first-run estimate
//! 4. Saves the job, refusing one that duplicates an existing job
//! 5. Follows the first run until its queue is drained

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Args;
use syncpanel_core::{
    domain::{Direction, DomainError, Job, SolvePolicy},
    ports::IAgentApi,
    usecases::{CreateJobUseCase, JobDraft},
};
use syncpanel_poller::{watch_until_drained, PollSchedule};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{workspaces::ServerArgs, Context};
use crate::output::{format_bytes, format_seconds, OutputFormatter};

#[derive(Debug, Args)]
pub struct NewCommand {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Slug of the workspace to sync
    #[arg(long)]
    pub workspace: String,

    /// Remote folder inside the workspace
    #[arg(long, default_value = "/")]
    pub folder: String,

    /// Local directory; the agent suggests one when omitted
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// up, down or bi
    #[arg(long)]
    pub direction: Option<Direction>,

    /// Conflict policy: manual, local, remote or both
    #[arg(long)]
    pub solve: Option<SolvePolicy>,

    /// Return as soon as the job is saved
    #[arg(long)]
    pub no_watch: bool,
}

impl NewCommand {
    /// Execute the new command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();

        let mut draft = match self.server.draft() {
            Ok(draft) => draft,
            Err(e) => {
                formatter.error(&e.to_string());
                return Ok(());
            }
        };
        if draft.job.password.as_deref().map_or(true, str::is_empty) {
            formatter.error(&DomainError::MissingPassword.to_string());
            return Ok(());
        }

        let usecase = CreateJobUseCase::new(api.clone());
        let Some(job) = self
            .build(&usecase, &mut draft, api.as_ref(), formatter.as_ref())
            .await
        else {
            return Ok(());
        };

        info!(job_id = %job.id, label = %job.label, directory = %job.directory, "Job saved");

        if ctx.is_json() && self.no_watch {
            formatter.print_json(&super::jobs::job_json(&job));
            return Ok(());
        }
        formatter.success(&format!("Created job '{}' [{}]", job.label, job.id));
        if self.no_watch {
            return Ok(());
        }

        let polling = ctx.config().polling;
        let schedule = PollSchedule::new(polling.job_watch_interval(), polling.backoff());
        let token = CancellationToken::new();
        let interrupt = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        formatter.info("Waiting for the first run to finish (Ctrl-C to stop watching)");
        let mut last = None;
        let finished = watch_until_drained(api, &job.id, schedule, token, |job| {
            if job.progress != last {
                last = job.progress;
                if let Some(percent) = job.progress {
                    formatter.info(&format!("Synced {:.0}%", percent));
                }
            }
        })
        .await;

        match finished {
            Some(job) if ctx.is_json() => formatter.print_json(&super::jobs::job_json(&job)),
            Some(job) => formatter.success(&format!("First run of '{}' completed", job.label)),
            None if ctx.is_json() => formatter.print_json(&super::jobs::job_json(&job)),
            None => formatter.info("Stopped watching; the job keeps running in the agent"),
        }
        Ok(())
    }

    /// Fills the draft step by step and saves it. Reports failures itself.
    async fn build(
        &self,
        usecase: &CreateJobUseCase,
        draft: &mut JobDraft,
        api: &dyn IAgentApi,
        formatter: &dyn OutputFormatter,
    ) -> Option<Job> {
        if let Err(e) = usecase.load_workspaces(draft).await {
            formatter.error(&e.user_message());
            return None;
        }
        if let Err(e) = draft.choose_workspace(&self.workspace) {
            formatter.error(&e.to_string());
            let slugs: Vec<&str> = draft
                .repositories
                .iter()
                .filter_map(|w| w.slug.as_deref())
                .collect();
            if slugs.is_empty() {
                formatter.info("The server offers no syncable workspace");
            } else {
                formatter.info(&format!("Syncable workspaces: {}", slugs.join(", ")));
            }
            return None;
        }
        draft.choose_remote_folder(&self.folder);
        if let Some(direction) = self.direction {
            draft.job.direction = direction;
        }
        if let Some(solve) = self.solve {
            draft.job.solve = solve;
        }

        match &self.directory {
            Some(directory) => draft.job.directory = directory.display().to_string(),
            None => {
                if let Err(e) = usecase.suggest_directory(draft).await {
                    formatter.error(&format!("Cannot pick a local directory: {}", e.user_message()));
                    return None;
                }
            }
        }

        match usecase.estimate(draft).await {
            Ok(estimate) => formatter.info(&format!(
                "First run: {} in about {}",
                format_bytes(estimate.byte_size),
                format_seconds(estimate.eta)
            )),
            Err(e) => formatter.warn(&format!("No size estimate: {}", e.user_message())),
        }

        let existing = match api.list_jobs().await {
            Ok(list) => list.jobs,
            Err(e) => {
                formatter.error(&e.user_message());
                return None;
            }
        };

        match usecase.create(draft, &existing).await {
            Ok(job) => Some(job),
            Err(e) => {
                formatter.error(&e.user_message());
                None
            }
        }
    }
}
