//! CLI subcommands
//!
//! Every command receives a [`Context`] carrying the global flags and knows
//! how to build the agent client from the configuration file.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use syncpanel_agent::AgentClient;
use syncpanel_core::{
    config::Config,
    domain::Job,
    ports::{AgentError, IAgentApi},
};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub mod completions;
pub mod config;
pub mod conflicts;
pub mod endpoint;
pub mod folders;
pub mod jobs;
pub mod logs;
pub mod new;
pub mod settings;
pub mod share;
pub mod watch;
pub mod workspaces;

/// Global flags shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
}

impl Context {
    pub fn new(format: OutputFormat, quiet: bool, config_path: PathBuf) -> Self {
        Self {
            format,
            quiet,
            config_path,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json(), self.quiet)
    }

    /// The configuration file, or defaults when it is missing or unreadable.
    pub fn config(&self) -> Config {
        Config::load_or_default(&self.config_path)
    }

    /// An agent client built from the `agent` section of the configuration.
    pub fn agent(&self) -> Result<Arc<dyn IAgentApi>> {
        let config = self.config();
        let client = AgentClient::from_config(&config.agent)
            .with_context(|| format!("Cannot use agent address '{}'", config.agent.url))?;
        Ok(Arc::new(client))
    }
}

/// Finds a job by id, falling back to an exact label match.
pub(crate) fn find_job<'a>(jobs: &'a [Job], key: &str) -> Option<&'a Job> {
    jobs.iter()
        .find(|job| job.id == key)
        .or_else(|| jobs.iter().find(|job| job.label == key))
}

/// Outcome of looking a job up on the agent
pub(crate) enum Lookup {
    Found(Job),
    Missing,
    Failed(AgentError),
}

/// Lists the agent's jobs and picks the one matching `key`.
pub(crate) async fn lookup_job(api: &dyn IAgentApi, key: &str) -> Lookup {
    match api.list_jobs().await {
        Ok(list) => match find_job(&list.jobs, key) {
            Some(job) => Lookup::Found(job.clone()),
            None => Lookup::Missing,
        },
        Err(err) => Lookup::Failed(err),
    }
}

/// Resolves `key` to a job, reporting a miss or an agent failure.
pub(crate) async fn require_job(
    api: &dyn IAgentApi,
    key: &str,
    formatter: &dyn OutputFormatter,
) -> Option<Job> {
    match lookup_job(api, key).await {
        Lookup::Found(job) => Some(job),
        Lookup::Missing => {
            formatter.error(&format!("No job matches '{}'", key));
            formatter.info("Run 'syncpanel jobs list' to see the configured jobs.");
            None
        }
        Lookup::Failed(err) => {
            formatter.error(&err.user_message());
            None
        }
    }
}
