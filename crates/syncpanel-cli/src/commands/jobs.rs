//! Jobs command - List, inspect, edit and command sync jobs
//!
//! Provides the `syncpanel jobs` CLI command which:
//! 1. Lists the configured jobs with their badge and progress
//! 2. Shows one job's configuration and current transfer state
//! 3. Sends enable/disable/pause/resume/resync commands
//! 4. Edits a job's settings and saves them when something changed
//! 5. Deletes a job

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use syncpanel_core::{
    domain::{workspace::badge_for, Direction, Job, SolvePolicy},
    ports::{IAgentApi, JobCommand},
    usecases::{is_modified, ManageJobUseCase},
};
use tracing::info;

use super::{require_job, Context};
use crate::output::{format_bytes, format_seconds};

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List configured jobs
    List,
    /// Show a job's configuration and state
    Show {
        /// Job id or label
        job: String,
    },
    /// Delete a job
    Delete {
        /// Job id or label
        job: String,
    },
    /// Enable a job
    Enable {
        /// Job id or label
        job: String,
    },
    /// Disable a job
    Disable {
        /// Job id or label
        job: String,
    },
    /// Pause a running job
    Pause {
        /// Job id or label
        job: String,
    },
    /// Resume a paused job
    Resume {
        /// Job id or label
        job: String,
    },
    /// Force a full resynchronization
    Resync {
        /// Job id or label
        job: String,
    },
    /// Change a job's settings
    Save(SaveArgs),
}

/// Editable settings of a job; unset flags keep their value
#[derive(Debug, Clone, Default, Args)]
pub struct SaveArgs {
    /// Job id or label
    pub job: String,
    #[arg(long)]
    pub label: Option<String>,
    /// Local directory
    #[arg(long)]
    pub directory: Option<String>,
    /// auto, manual or time
    #[arg(long, value_parser = ["auto", "manual", "time"])]
    pub frequency: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u32>,
    /// Number of parallel transfers
    #[arg(long)]
    pub poolsize: Option<u32>,
    /// up, down or bi
    #[arg(long)]
    pub direction: Option<Direction>,
    /// Conflict policy: manual, local, remote or both
    #[arg(long)]
    pub solve: Option<SolvePolicy>,
    /// Accept self-signed certificates
    #[arg(long)]
    pub trust_ssl: Option<bool>,
    /// New password for the remote server
    #[arg(long)]
    pub password: Option<String>,
}

impl SaveArgs {
    /// Copies the given flags onto `job`.
    fn apply_to(&self, job: &mut Job) {
        if let Some(label) = &self.label {
            job.label = label.clone();
        }
        if let Some(directory) = &self.directory {
            job.directory = directory.clone();
        }
        if let Some(frequency) = &self.frequency {
            job.frequency = frequency.clone();
        }
        if let Some(timeout) = self.timeout {
            job.timeout = timeout;
        }
        if let Some(poolsize) = self.poolsize {
            job.poolsize = poolsize;
        }
        if let Some(direction) = self.direction {
            job.direction = direction;
        }
        if let Some(solve) = self.solve {
            job.solve = solve;
        }
        if let Some(trust_ssl) = self.trust_ssl {
            job.trust_ssl = trust_ssl;
        }
        if let Some(password) = &self.password {
            job.password = Some(password.clone());
        }
    }
}

impl JobsCommand {
    /// Execute the jobs command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        match self {
            JobsCommand::List => execute_list(api, ctx).await,
            JobsCommand::Show { job } => execute_show(api, job, ctx).await,
            JobsCommand::Delete { job } => execute_delete(api, job, ctx).await,
            JobsCommand::Enable { job } => execute_command(api, JobCommand::Enable, job, ctx).await,
            JobsCommand::Disable { job } => {
                execute_command(api, JobCommand::Disable, job, ctx).await
            }
            JobsCommand::Pause { job } => execute_command(api, JobCommand::Pause, job, ctx).await,
            JobsCommand::Resume { job } => execute_command(api, JobCommand::Resume, job, ctx).await,
            JobsCommand::Resync { job } => execute_command(api, JobCommand::Resync, job, ctx).await,
            JobsCommand::Save(args) => execute_save(api, args, ctx).await,
        }
    }
}

async fn execute_list(api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();

    let list = match api.list_jobs().await {
        Ok(list) => list,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    info!(count = list.jobs.len(), "Listing jobs");

    if ctx.is_json() {
        let jobs: Vec<serde_json::Value> = list.jobs.iter().map(job_json).collect();
        let json = serde_json::json!({
            "jobs": jobs,
            "internet_ok": list.internet_ok,
        });
        formatter.print_json(&json);
        return Ok(());
    }

    if list.internet_ok == Some(false) {
        formatter.warn("The agent reports no internet connection");
    }
    if list.jobs.is_empty() {
        formatter.success("No jobs configured");
        formatter.info("Run 'syncpanel new' to create one.");
        return Ok(());
    }

    formatter.success(&format!(
        "{} job{}",
        list.jobs.len(),
        if list.jobs.len() == 1 { "" } else { "s" }
    ));
    for job in &list.jobs {
        formatter.info(&describe_job(job));
    }
    Ok(())
}

async fn execute_show(api: Arc<dyn IAgentApi>, key: &str, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
        return Ok(());
    };

    if ctx.is_json() {
        formatter.print_json(&job_json(&job));
        return Ok(());
    }

    formatter.success(&format!("{} [{}]", job.label, job.id));
    for line in job_details(&job) {
        formatter.info(&line);
    }
    Ok(())
}

async fn execute_delete(api: Arc<dyn IAgentApi>, key: &str, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
        return Ok(());
    };

    match ManageJobUseCase::new(api).delete(&job.id).await {
        Ok(()) => {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": true,
                    "deleted": job.id,
                }));
            } else {
                formatter.success(&format!("Deleted job '{}'", job.label));
                formatter.info(&format!("Local files in {} are kept", job.directory));
            }
        }
        Err(e) => formatter.error(&format!("Failed to delete '{}': {}", job.label, e.user_message())),
    }
    Ok(())
}

async fn execute_command(
    api: Arc<dyn IAgentApi>,
    command: JobCommand,
    key: &str,
    ctx: &Context,
) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
        return Ok(());
    };

    let refreshed = match ManageJobUseCase::new(api).apply_command(command, &job.id).await {
        Ok(list) => list,
        Err(e) => {
            formatter.error(&format!(
                "Failed to {} '{}': {}",
                command,
                job.label,
                e.user_message()
            ));
            return Ok(());
        }
    };
    let current = refreshed.jobs.iter().find(|j| j.id == job.id);

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "command": command.as_str(),
            "job": current.map(job_json),
        }));
    } else {
        formatter.success(&format!("Sent {} to '{}'", command, job.label));
        if let Some(current) = current {
            formatter.info(&describe_job(current));
        }
    }
    Ok(())
}

async fn execute_save(api: Arc<dyn IAgentApi>, args: &SaveArgs, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(listed) = require_job(api.as_ref(), &args.job, formatter.as_ref()).await else {
        return Ok(());
    };
    let snapshot = match api.get_job(&listed.id).await {
        Ok(job) => job,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    let mut edited = snapshot.clone();
    args.apply_to(&mut edited);
    if !is_modified(&edited, &snapshot) {
        formatter.success(&format!("Nothing to change for '{}'", snapshot.label));
        return Ok(());
    }

    let saved = match ManageJobUseCase::new(api).save(&edited).await {
        Ok(job) => job,
        Err(e) => {
            formatter.error(&format!("Failed to save '{}': {}", snapshot.label, e.user_message()));
            return Ok(());
        }
    };

    info!(job_id = %saved.id, "Job settings saved");

    if ctx.is_json() {
        formatter.print_json(&job_json(&saved));
    } else {
        formatter.success(&format!("Saved '{}'", saved.label));
        for line in job_details(&saved) {
            formatter.info(&line);
        }
    }
    Ok(())
}

/// Job as JSON with the derived progress included.
pub(crate) fn job_json(job: &Job) -> serde_json::Value {
    let mut value = serde_json::to_value(job).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("progress".into(), serde_json::json!(job.progress_percent()));
    }
    value
}

/// One-word state of a job.
pub(crate) fn job_status(job: &Job) -> String {
    if !job.active {
        return "disabled".to_string();
    }
    if !job.running {
        return "idle".to_string();
    }
    match job.progress_percent() {
        Some(percent) => format!("syncing {:.0}%", percent),
        None => "syncing".to_string(),
    }
}

/// Single list line: badge, label, id and state.
pub(crate) fn describe_job(job: &Job) -> String {
    format!(
        "{:<3} {} [{}] {}",
        badge_for(&job.workspace),
        job.label,
        job.id,
        job_status(job)
    )
}

/// Detail lines for `jobs show`.
pub(crate) fn job_details(job: &Job) -> Vec<String> {
    let mut lines = vec![
        format!("Server:       {}", job.server),
        format!("User:         {}", job.user),
        format!("Workspace:    {} ({})", job.workspace, badge_for(&job.workspace)),
        format!("Remote:       {}", job.remote_folder),
        format!("Local:        {}", job.directory),
        format!("Direction:    {}", job.direction),
        format!("Conflicts:    {}", job.solve),
        format!("Frequency:    {}", job.frequency),
        format!("Status:       {}", job_status(job)),
    ];

    if let Some(state) = &job.state {
        let global = &state.global;
        lines.push(format!(
            "Queue:        {:.0} / {:.0}",
            global.queue_done, global.queue_length
        ));
        if global.last_transfer_rate > 0.0 {
            lines.push(format!(
                "Rate:         {}/s",
                format_bytes(global.last_transfer_rate)
            ));
        }
        if job.running {
            lines.push(format!("Remaining:    {}", format_seconds(global.eta)));
        }
        for task in &state.tasks.current {
            if let Some(target) = &task.target {
                lines.push(format!("Transferring: {}", target));
            }
        }
    }

    if let Some(event) = &job.last_event {
        lines.push(format!("Last event:   {} ({})", event.message, event.date));
    }
    lines
}
