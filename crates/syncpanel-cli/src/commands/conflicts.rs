//! Conflicts command - List and resolve a job's conflicts
//!
//! Provides the `syncpanel conflicts` CLI command which:
//! 1. Lists the conflicts the agent reports for a job
//! 2. Records a resolution for one conflict, or for every unsolved one

use std::sync::Arc;

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use syncpanel_core::{
    domain::{Conflict, ConflictSide, ConflictStatus, ResolveTarget},
    ports::IAgentApi,
    usecases::ResolveConflictsUseCase,
};
use tracing::info;

use super::{require_job, Context};

#[derive(Debug, Subcommand)]
pub enum ConflictsCommand {
    /// List conflicts of a job
    List {
        /// Job id or label
        job: String,
    },
    /// Resolve conflicts of a job
    Resolve {
        /// Job id or label
        job: String,
        /// Node id of the conflict to resolve
        #[arg(required_unless_present = "all")]
        node: Option<String>,
        /// Apply to every conflict that is not solved yet
        #[arg(long, conflicts_with = "node")]
        all: bool,
        /// Which version to keep
        #[arg(long, value_enum)]
        keep: Resolution,
    },
}

/// Resolution choices offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    /// Keep the local version
    Local,
    /// Keep the remote version
    Remote,
    /// Keep both versions
    Both,
    /// Mark the conflict as unsolved again
    Unsolved,
}

impl Resolution {
    pub fn status(self) -> ConflictStatus {
        match self {
            Resolution::Local => ConflictStatus::Solved("KEEPLOCAL".to_string()),
            Resolution::Remote => ConflictStatus::Solved("KEEPREMOTE".to_string()),
            Resolution::Both => ConflictStatus::Solved("KEEPBOTH".to_string()),
            Resolution::Unsolved => ConflictStatus::Unsolved,
        }
    }
}

impl ConflictsCommand {
    /// Execute the conflicts command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        match self {
            ConflictsCommand::List { job } => execute_list(api, job, ctx).await,
            ConflictsCommand::Resolve {
                job,
                node,
                all,
                keep,
            } => {
                let target = match (node.as_deref(), *all) {
                    (Some(node), false) => ResolveTarget::Node(node.to_string()),
                    _ => ResolveTarget::AllUnsolved,
                };
                execute_resolve(api, job, &target, keep.status(), ctx).await
            }
        }
    }
}

async fn execute_list(api: Arc<dyn IAgentApi>, key: &str, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
        return Ok(());
    };

    let set = match ResolveConflictsUseCase::new(api).list(&job.id).await {
        Ok(set) => set,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    info!(job_id = %job.id, count = set.len(), "Retrieved conflicts");

    if ctx.is_json() {
        let json = serde_json::json!({
            "job_id": job.id,
            "count": set.len(),
            "unsolved": set.unsolved_count(),
            "conflicts": set.conflicts(),
        });
        formatter.print_json(&json);
        return Ok(());
    }

    if set.is_empty() {
        formatter.success(&format!("No conflicts for '{}'", job.label));
        return Ok(());
    }

    formatter.success(&format!(
        "{} conflict{} for '{}', {} unsolved",
        set.len(),
        if set.len() == 1 { "" } else { "s" },
        job.label,
        set.unsolved_count()
    ));
    for conflict in set.conflicts() {
        formatter.info(&describe_conflict(conflict));
    }
    Ok(())
}

async fn execute_resolve(
    api: Arc<dyn IAgentApi>,
    key: &str,
    target: &ResolveTarget,
    status: ConflictStatus,
    ctx: &Context,
) -> Result<()> {
    let formatter = ctx.formatter();
    let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
        return Ok(());
    };

    let usecase = ResolveConflictsUseCase::new(api);
    let mut set = match usecase.list(&job.id).await {
        Ok(set) => set,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    if let ResolveTarget::Node(node) = target {
        if !set.conflicts().iter().any(|c| &c.node_id == node) {
            formatter.error(&format!("No conflict with node id '{}' in '{}'", node, job.label));
            return Ok(());
        }
    }

    let saved = match usecase.resolve(&mut set, target, &status).await {
        Ok(count) => count,
        Err(e) => {
            formatter.error(&format!("Failed to save resolution: {}", e.user_message()));
            return Ok(());
        }
    };

    if ctx.is_json() {
        let json = serde_json::json!({
            "success": true,
            "job_id": job.id,
            "status": status.to_string(),
            "saved": saved,
            "unsolved": set.unsolved_count(),
        });
        formatter.print_json(&json);
    } else if saved == 0 {
        formatter.success("Nothing to resolve");
    } else {
        formatter.success(&format!(
            "Marked {} conflict{} as {}",
            saved,
            if saved == 1 { "" } else { "s" },
            status
        ));
        formatter.info(&format!("{} still unsolved", set.unsolved_count()));
    }
    Ok(())
}

fn describe_conflict(conflict: &Conflict) -> String {
    let side = match conflict.side {
        Some(ConflictSide::Local) => "local",
        Some(ConflictSide::Remote) => "remote",
        _ => "-",
    };
    let mut line = format!(
        "{:<6} {:<18} {:<6} {}",
        conflict.node_id,
        conflict.status.to_string(),
        side,
        conflict.node_path
    );
    if let Some(message) = &conflict.message {
        line.push_str(&format!("  ({})", message));
    }
    line
}
