//! Folders command - Browse the remote folders of a workspace
//!
//! Provides the `syncpanel folders` CLI command which:
//! 1. Lists the top-level folders of a job's workspace, or of a workspace
//!    reached with credentials given on the command line
//! 2. Expands the folders given with `--expand`, fetching each level once
//! 3. Previews where a new folder would be created with `--new-folder`

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use syncpanel_cache::{FolderBrowser, FolderTree};
use syncpanel_core::{
    domain::DomainError,
    ports::{IAgentApi, RemoteTarget, ServerCredentials},
};
use tracing::info;

use super::{require_job, workspaces::ServerArgs, Context};

#[derive(Debug, Args)]
pub struct FoldersCommand {
    /// Browse the workspace of this job (id or label)
    #[arg(conflicts_with = "server")]
    pub job: Option<String>,

    #[command(flatten)]
    pub server: ServerArgs,

    /// Workspace slug; defaults to the job's workspace
    #[arg(long)]
    pub workspace: Option<String>,

    /// Folder to expand; repeat for several
    #[arg(long = "expand", value_name = "PATH")]
    pub expand: Vec<String>,

    /// Show a new folder under PATH (`/` for the top level)
    #[arg(long, value_name = "PATH")]
    pub new_folder: Option<String>,

    /// Name of the new folder
    #[arg(long, requires = "new_folder")]
    pub name: Option<String>,
}

impl FoldersCommand {
    /// Execute the folders command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();

        let (target, workspace) = match &self.job {
            Some(key) => {
                let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
                    return Ok(());
                };
                let workspace = self.workspace.clone().unwrap_or(job.workspace);
                (RemoteTarget::Job(job.id), workspace)
            }
            None => {
                let draft = match self.server.draft() {
                    Ok(draft) => draft,
                    Err(e) => {
                        formatter.error(&format!("{} (or give a job)", e));
                        return Ok(());
                    }
                };
                if draft.job.password.as_deref().map_or(true, str::is_empty) {
                    formatter.error(&DomainError::MissingPassword.to_string());
                    return Ok(());
                }
                let Some(workspace) = self.workspace.clone() else {
                    formatter.error("--workspace is required with --server");
                    return Ok(());
                };
                (
                    RemoteTarget::Request(ServerCredentials::from_job(&draft.job)),
                    workspace,
                )
            }
        };

        let mut browser = FolderBrowser::new(api, target, workspace);
        if let Err(e) = browser.load_roots().await {
            formatter.error(&format!("Cannot list folders of '{}': {}", browser.workspace(), e));
            return Ok(());
        }
        for path in &self.expand {
            if let Err(e) = browser.reveal(path).await {
                formatter.warn(&format!("Cannot expand '{}': {}", path, e));
            }
        }

        if let Some(parent) = &self.new_folder {
            match browser.tree_mut().create_placeholder(parent) {
                Ok(node) => {
                    if let Some(name) = &self.name {
                        let parent_path = node
                            .path
                            .rsplit_once('/')
                            .map(|(p, _)| p.to_string())
                            .unwrap_or_default();
                        node.path = format!("{}/{}", parent_path, name);
                        node.name = name.clone();
                    }
                }
                Err(e) => formatter.warn(&format!("Cannot add a folder under '{}': {}", parent, e)),
            }
        }

        info!(
            workspace = %browser.workspace(),
            nodes = browser.tree().depth_first().len(),
            "Folder tree ready"
        );

        if ctx.is_json() {
            let json = serde_json::json!({
                "workspace": browser.workspace(),
                "folders": browser.tree().roots(),
                "new_folder": browser.tree().placeholder().map(|n| n.path.clone()),
            });
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("Folders of '{}'", browser.workspace()));
        for line in render_tree(browser.tree()) {
            formatter.info(&line);
        }
        Ok(())
    }
}

/// One line per node: `+` not loaded yet, `-` expanded, `*` new folder.
pub(crate) fn render_tree(tree: &FolderTree) -> Vec<String> {
    if tree.is_empty() {
        return vec!["(empty)".to_string()];
    }
    tree.depth_first()
        .into_iter()
        .map(|(depth, node)| {
            let marker = if node.placeholder {
                '*'
            } else if node.is_loaded() {
                '-'
            } else {
                '+'
            };
            let name = if node.name.is_empty() {
                node.basename()
            } else {
                node.name.as_str()
            };
            format!("{}{} {}", "  ".repeat(depth), marker, name)
        })
        .collect()
}
