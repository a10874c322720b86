//! Syncpanel CLI - Control panel for the local file sync agent
//!
//! Provides commands for:
//! - Listing, editing and commanding sync jobs
//! - Watching live progress, logs and conflicts
//! - Creating a job through the connection, workspace and folder steps
//! - Browsing remote folders and managing share links
//! - Reading and updating the agent's settings

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use syncpanel_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand,
    config::ConfigCommand,
    conflicts::ConflictsCommand,
    endpoint::EndpointCommand,
    folders::FoldersCommand,
    jobs::JobsCommand,
    logs::LogsCommand,
    new::NewCommand,
    settings::{ProxyCommand, SettingsCommand},
    share::ShareCommand,
    watch::WatchCommand,
    workspaces::WorkspacesCommand,
    Context,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "syncpanel", version, about = "Control panel for the file sync agent")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List, edit and command sync jobs
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Follow jobs live, with logs and conflicts of one job
    Watch(WatchCommand),
    /// Show a job's transfer history
    Logs(LogsCommand),
    /// List and resolve conflicts of a job
    #[command(subcommand)]
    Conflicts(ConflictsCommand),
    /// List the syncable workspaces of a server
    Workspaces(WorkspacesCommand),
    /// Browse the remote folders of a workspace
    Folders(FoldersCommand),
    /// Manage public share links
    #[command(subcommand)]
    Share(ShareCommand),
    /// View and change the agent's general settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// View and change the agent's proxy settings
    #[command(subcommand)]
    Proxy(ProxyCommand),
    /// Resolve a client id to a server address
    Endpoint(EndpointCommand),
    /// Create a new sync job
    New(NewCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Log level used when `RUST_LOG` is not set.
fn log_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    match verbose {
        0 if quiet => "warn".to_string(),
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing
    let filter = log_filter(cli.verbose, cli.quiet, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = Context::new(format, cli.quiet, config_path);

    match cli.command {
        Commands::Jobs(cmd) => cmd.execute(&ctx).await,
        Commands::Watch(cmd) => cmd.execute(&ctx).await,
        Commands::Logs(cmd) => cmd.execute(&ctx).await,
        Commands::Conflicts(cmd) => cmd.execute(&ctx).await,
        Commands::Workspaces(cmd) => cmd.execute(&ctx).await,
        Commands::Folders(cmd) => cmd.execute(&ctx).await,
        Commands::Share(cmd) => cmd.execute(&ctx).await,
        Commands::Settings(cmd) => cmd.execute(&ctx).await,
        Commands::Proxy(cmd) => cmd.execute(&ctx).await,
        Commands::Endpoint(cmd) => cmd.execute(&ctx).await,
        Commands::New(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
