//! Workspaces command - List the syncable workspaces of a server
//!
//! Provides the `syncpanel workspaces` CLI command which:
//! 1. Asks the agent for the workspaces reachable with a job's stored
//!    credentials, or with credentials given on the command line
//! 2. Shows only the workspaces that can be synced, with their badge

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use syncpanel_core::{
    domain::Workspace,
    ports::IAgentApi,
    usecases::{JobDraft, ListWorkspacesUseCase, WorkspaceChoice},
};
use tracing::info;

use super::{require_job, Context};

/// Connection details of a remote server
#[derive(Debug, Clone, Default, Args)]
pub struct ServerArgs {
    /// Server address; `https://` is assumed when no scheme is given
    #[arg(long)]
    pub server: Option<String>,
    /// User name on the server
    #[arg(long, requires = "server")]
    pub user: Option<String>,
    /// Password on the server
    #[arg(long, requires = "server")]
    pub password: Option<String>,
    /// Accept self-signed certificates
    #[arg(long)]
    pub trust_ssl: bool,
}

impl ServerArgs {
    /// A draft carrying these connection details.
    pub fn draft(&self) -> Result<JobDraft> {
        let Some(server) = &self.server else {
            bail!("A server address is required");
        };
        let mut draft = JobDraft::new();
        draft.set_server(server)?;
        draft.set_credentials(
            self.user.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        draft.job.trust_ssl = self.trust_ssl;
        Ok(draft)
    }
}

#[derive(Debug, Args)]
pub struct WorkspacesCommand {
    /// Use the credentials stored for this job (id or label)
    #[arg(long, conflicts_with = "server")]
    pub job: Option<String>,

    #[command(flatten)]
    pub server: ServerArgs,
}

impl WorkspacesCommand {
    /// Execute the workspaces command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let usecase = ListWorkspacesUseCase::new(api.clone());

        let outcome = match (&self.job, &self.server.server) {
            (Some(key), _) => {
                let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
                    return Ok(());
                };
                usecase.for_job(&job.id).await
            }
            (None, Some(_)) => {
                let draft = match self.server.draft() {
                    Ok(draft) => draft,
                    Err(e) => {
                        formatter.error(&e.to_string());
                        return Ok(());
                    }
                };
                usecase.for_credentials(&draft.job).await
            }
            (None, None) => {
                formatter.error("Give either --job or --server");
                return Ok(());
            }
        };

        let choice = match outcome {
            Ok(choice) => choice,
            Err(e) => {
                formatter.error(&e.user_message());
                return Ok(());
            }
        };

        info!(count = choice.workspaces.len(), "Listed workspaces");

        if ctx.is_json() {
            formatter.print_json(&choice_json(&choice));
            return Ok(());
        }

        let title = choice.application_title.as_deref().unwrap_or("Server");
        match &choice.user_display_name {
            Some(user) => formatter.success(&format!("{} (signed in as {})", title, user)),
            None => formatter.success(title),
        }
        if choice.workspaces.is_empty() {
            formatter.info("No syncable workspace");
        }
        for workspace in &choice.workspaces {
            formatter.info(&describe_workspace(workspace));
        }
        Ok(())
    }
}

pub(crate) fn describe_workspace(workspace: &Workspace) -> String {
    format!(
        "{:<3} {} ({})",
        workspace.badge(),
        workspace.label,
        workspace.slug.as_deref().unwrap_or("?")
    )
}

fn choice_json(choice: &WorkspaceChoice) -> serde_json::Value {
    let workspaces: Vec<serde_json::Value> = choice
        .workspaces
        .iter()
        .map(|w| {
            serde_json::json!({
                "slug": w.slug,
                "label": w.label,
                "badge": w.badge(),
            })
        })
        .collect();
    serde_json::json!({
        "application_title": choice.application_title,
        "user_display_name": choice.user_display_name,
        "workspaces": workspaces,
    })
}
