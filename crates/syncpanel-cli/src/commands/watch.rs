//! Watch command - Follow the agent's jobs live
//!
//! Provides the `syncpanel watch` CLI command which:
//! 1. Polls the job list and redraws it whenever something changes
//! 2. With `--job`, also follows that job's logs, running task and conflicts
//! 3. Keeps the last known state on screen while the agent is unreachable
//! 4. Stops on Ctrl-C or after `--duration` seconds

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Args;
use syncpanel_core::ports::IAgentApi;
use syncpanel_poller::{Dashboard, DashboardState};
use tracing::{info, warn};

use super::{jobs::describe_job, lookup_job, Context, Lookup};
use crate::output::{format_bytes, format_seconds};

/// Log lines shown per frame
const LOG_LINES: usize = 10;

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Also follow logs and conflicts of this job (id or label)
    #[arg(long)]
    pub job: Option<String>,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<u64>,
}

impl WatchCommand {
    /// Execute the watch command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();

        let selected = match &self.job {
            None => None,
            Some(key) => match lookup_job(api.as_ref(), key).await {
                Lookup::Found(job) => Some(job.id),
                Lookup::Missing => {
                    formatter.error(&format!("No job matches '{}'", key));
                    return Ok(());
                }
                Lookup::Failed(err) => {
                    warn!(job = %key, error = %err, "Cannot look the job up yet, using it as an id");
                    Some(key.clone())
                }
            },
        };

        let mut dashboard = Dashboard::new(api, ctx.config().polling);
        dashboard.start();
        dashboard.select_job(selected.as_deref());
        let mut revisions = dashboard.subscribe();

        info!(job_id = ?selected, "Watching agent");

        let deadline = async {
            match self.duration {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        let interrupted = tokio::signal::ctrl_c();
        tokio::pin!(interrupted);

        loop {
            tokio::select! {
                _ = &mut interrupted => break,
                _ = &mut deadline => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = dashboard.state();
                    if ctx.is_json() {
                        formatter.print_json(&state_json(&state));
                    } else {
                        formatter.info("");
                        for line in render(&state) {
                            formatter.info(&line);
                        }
                    }
                }
            }
        }

        dashboard.shutdown().await;
        Ok(())
    }
}

/// Text frame for the current dashboard state.
pub(crate) fn render(state: &DashboardState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = state.jobs.error() {
        lines.push(format!("! {}", error));
    }
    if state.jobs.internet_ok() == Some(false) {
        lines.push("! No internet connection".to_string());
    }

    if state.jobs.jobs().is_empty() {
        lines.push("No jobs".to_string());
    }
    for job in state.jobs.jobs() {
        let marker = if state.jobs.selected_id() == Some(job.id.as_str()) {
            '>'
        } else {
            ' '
        };
        lines.push(format!("{} {}", marker, describe_job(job)));
    }

    let Some(job_id) = state.logs.job_id() else {
        return lines;
    };

    lines.push(String::new());
    if let Some(running) = state.logs.running() {
        let global = &running.global;
        lines.push(format!(
            "Running: {:.0}/{:.0} at {}/s, {} left",
            global.queue_done,
            global.queue_length,
            format_bytes(global.last_transfer_rate),
            format_seconds(global.eta)
        ));
        for task in &running.tasks.current {
            let target = task.target.as_deref().unwrap_or("?");
            match task.progress {
                Some(progress) => lines.push(format!("  {} ({:.0}%)", target, progress)),
                None => lines.push(format!("  {}", target)),
            }
        }
    }

    if let Some(error) = state.logs.error() {
        lines.push(format!("! Logs: {}", error));
    }
    match state.logs.logs() {
        None => lines.push(format!("Logs of {}: loading", job_id)),
        Some([]) => lines.push(format!("Logs of {}: none", job_id)),
        Some(logs) => {
            lines.push(format!("Logs of {}:", job_id));
            for entry in logs.iter().take(LOG_LINES) {
                lines.push(format!("  {} [{}] {}", entry.display_date(), entry.kind, entry.message));
            }
        }
    }

    if let Some(error) = state.conflicts.error() {
        lines.push(format!("! Conflicts: {}", error));
    }
    if let Some(set) = state.conflicts.set() {
        if !set.is_empty() {
            lines.push(format!(
                "Conflicts: {} unsolved of {}",
                set.unsolved_count(),
                set.len()
            ));
        }
    }
    lines
}

/// JSON frame for the current dashboard state.
pub(crate) fn state_json(state: &DashboardState) -> serde_json::Value {
    let jobs: Vec<serde_json::Value> = state
        .jobs
        .jobs()
        .iter()
        .map(super::jobs::job_json)
        .collect();
    serde_json::json!({
        "jobs": jobs,
        "internet_ok": state.jobs.internet_ok(),
        "error": state.jobs.error(),
        "selected": state.jobs.selected_id(),
        "logs": state.logs.logs(),
        "running": state.logs.running(),
        "conflicts": state.conflicts.set().map(|set| set.conflicts()),
    })
}
