//! Logs command - Show a job's transfer history
//!
//! Provides the `syncpanel logs` CLI command which:
//! 1. Fetches the job's recent log entries, optionally filtered
//! 2. Shows the task currently running, if any

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use syncpanel_core::{
    domain::LogsSnapshot,
    ports::{IAgentApi, LogFilter},
};
use tracing::info;

use super::{require_job, Context};
use crate::output::{format_bytes, format_seconds};

#[derive(Debug, Args)]
pub struct LogsCommand {
    /// Job id or label
    pub job: String,

    /// Only entries matching KEY=VALUE, e.g. `status=error`
    #[arg(long, value_parser = parse_filter)]
    pub filter: Option<LogFilter>,

    /// Maximum number of entries to print
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

impl LogsCommand {
    /// Execute the logs command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let Some(job) = require_job(api.as_ref(), &self.job, formatter.as_ref()).await else {
            return Ok(());
        };

        let snapshot = match api.job_logs(&job.id, self.filter.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                formatter.error(&e.user_message());
                return Ok(());
            }
        };

        info!(job_id = %job.id, entries = snapshot.logs.len(), "Showing logs");

        if ctx.is_json() {
            let json = serde_json::json!({
                "job_id": job.id,
                "logs": snapshot.logs.iter().take(self.limit).collect::<Vec<_>>(),
                "running": snapshot.running,
            });
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("Logs of '{}'", job.label));
        for line in render_logs(&snapshot, self.limit) {
            formatter.info(&line);
        }
        Ok(())
    }
}

/// Parses `KEY=VALUE` into a log filter.
fn parse_filter(raw: &str) -> Result<LogFilter> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{}'", raw);
    };
    if key.trim().is_empty() {
        bail!("Filter key is empty in '{}'", raw);
    }
    Ok(LogFilter {
        key: key.trim().to_string(),
        value: value.trim().to_string(),
    })
}

pub(crate) fn render_logs(snapshot: &LogsSnapshot, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(running) = &snapshot.running {
        lines.push(format!(
            "Running: {:.0}/{:.0}, {} left, {} remaining",
            running.global.queue_done,
            running.global.queue_length,
            format_seconds(running.global.eta),
            format_bytes(running.global.queue_bytesize.max(0) as f64)
        ));
    }
    if snapshot.logs.is_empty() {
        lines.push("No log entries".to_string());
    }
    for entry in snapshot.logs.iter().take(limit) {
        let status = entry.status.as_deref().unwrap_or("-");
        lines.push(format!(
            "{} {:<7} {:<8} {}",
            entry.display_date(), entry.kind, status, entry.message
        ));
    }
    if snapshot.logs.len() > limit {
        lines.push(format!("... {} more", snapshot.logs.len() - limit));
    }
    lines
}
