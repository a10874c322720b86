//! Share command - Manage public links to synced items
//!
//! Provides the `syncpanel share` CLI command which:
//! 1. Creates a public link for a file or folder of a job
//! 2. Checks whether an item is already shared
//! 3. Removes a share

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use syncpanel_core::{
    domain::{ShareLink, ShareRequest},
    ports::IAgentApi,
};
use tracing::info;

use super::{require_job, Context};
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Create a public link
    Create(CreateShareArgs),
    /// Check whether an item is already shared
    Check {
        /// Job id or label
        job: String,
        /// Path relative to the job's local directory
        path: String,
    },
    /// Remove a share
    Remove {
        /// Job id or label
        job: String,
        /// Path relative to the job's local directory
        path: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CreateShareArgs {
    /// Job id or label
    pub job: String,
    /// Path relative to the job's local directory
    pub path: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Protect the link with a password
    #[arg(long)]
    pub password: Option<String>,
    /// Days before the link expires, 0 for never
    #[arg(long, default_value_t = 0)]
    pub expire_days: u32,
    /// Allowed downloads, 0 for unlimited
    #[arg(long, default_value_t = 0)]
    pub downloads: u32,
    /// Forbid previewing the item
    #[arg(long)]
    pub no_preview: bool,
    /// Forbid downloading the item
    #[arg(long)]
    pub no_download: bool,
    /// Allow uploads into a shared folder
    #[arg(long)]
    pub upload: bool,
    /// Custom link slug
    #[arg(long)]
    pub handler: Option<String>,
}

impl CreateShareArgs {
    fn request(&self) -> ShareRequest {
        let mut request = ShareRequest::new(self.path.clone());
        request.description = self.description.clone();
        request.password = self.password.clone().unwrap_or_default();
        request.expiration_days = self.expire_days;
        request.downloads = self.downloads;
        request.can_read = !self.no_preview;
        request.can_download = !self.no_download;
        request.can_write = self.upload;
        request.link_handler = self.handler.clone();
        request
    }
}

impl ShareCommand {
    /// Execute the share command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let key = match self {
            ShareCommand::Create(args) => &args.job,
            ShareCommand::Check { job, .. } | ShareCommand::Remove { job, .. } => job,
        };
        let Some(job) = require_job(api.as_ref(), key, formatter.as_ref()).await else {
            return Ok(());
        };

        match self {
            ShareCommand::Create(args) => {
                let request = args.request();
                match api.share(&job.id, &request).await {
                    Ok(link) => {
                        info!(job_id = %job.id, path = %request.relative_path, "Share requested");
                        report_link(&link, ctx, formatter.as_ref());
                    }
                    Err(e) => formatter.error(&e.user_message()),
                }
            }
            ShareCommand::Check { path, .. } => match api.check_existing_share(&job.id, path).await {
                Ok(link) if link.existing || link.is_url() => {
                    report_link(&link, ctx, formatter.as_ref())
                }
                Ok(_) => {
                    if ctx.is_json() {
                        formatter.print_json(&serde_json::json!({"shared": false}));
                    } else {
                        formatter.success(&format!("'{}' is not shared", path));
                    }
                }
                Err(e) => formatter.error(&e.user_message()),
            },
            ShareCommand::Remove { path, .. } => match api.unshare(&job.id, path).await {
                Ok(()) => {
                    info!(job_id = %job.id, path = %path, "Share removed");
                    if ctx.is_json() {
                        formatter.print_json(&serde_json::json!({"success": true, "path": path}));
                    } else {
                        formatter.success(&format!("Stopped sharing '{}'", path));
                    }
                }
                Err(e) => formatter.error(&e.user_message()),
            },
        }
        Ok(())
    }
}

/// Prints a link, or the agent's message when the link is not a URL.
fn report_link(link: &ShareLink, ctx: &Context, formatter: &dyn OutputFormatter) {
    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "shared": link.is_url(),
            "link": link.link,
            "existing": link.existing,
        }));
    } else if link.is_url() {
        formatter.success(&link.link);
        if link.existing {
            formatter.info("This item was already shared");
        }
    } else {
        formatter.error(&link.link);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use syncpanel_core::{domain::Job, testing::StubAgent};

    use super::*;
    use crate::output::OutputFormat;

    fn args() -> CreateShareArgs {
        CreateShareArgs {
            job: "job-1".into(),
            path: "docs/report.pdf".into(),
            description: String::new(),
            password: None,
            expire_days: 0,
            downloads: 0,
            no_preview: false,
            no_download: false,
            upload: false,
            handler: None,
        }
    }

    #[test]
    fn test_request_defaults_match_share_dialog() {
        let request = args().request();
        assert_eq!(request, ShareRequest::new("docs/report.pdf"));
        assert_eq!(request.label(), "report.pdf");
    }

    #[test]
    fn test_request_flags() {
        let mut args = args();
        args.no_download = true;
        args.upload = true;
        args.expire_days = 7;
        args.handler = Some("my-report".into());
        let request = args.request();
        assert!(request.can_read);
        assert!(!request.can_download);
        assert!(request.can_write);
        assert_eq!(request.expiration_days, 7);
        assert_eq!(request.link_handler.as_deref(), Some("my-report"));
    }

    #[tokio::test]
    async fn test_create_share_for_resolved_job() {
        let stub = Arc::new(StubAgent::with(|s| {
            s.jobs = vec![Job {
                id: "job-1".into(),
                label: "Work".into(),
                ..Default::default()
            }];
            s.share_link = ShareLink {
                link: "https://files.example.com/public/abc".into(),
                existing: false,
            };
        }));
        let ctx = Context::new(OutputFormat::Human, true, PathBuf::from("/nonexistent"));
        let mut create = args();
        create.job = "Work".into();
        ShareCommand::Create(create)
            .run(stub.clone(), &ctx)
            .await
            .unwrap();
        assert_eq!(stub.calls(), vec!["list_jobs", "share:job-1:docs/report.pdf"]);
    }
}
