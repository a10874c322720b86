//! Config command - View and manage the panel's own configuration
//!
//! Provides the `syncpanel config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use anyhow::{Context as _, Result};
use clap::Subcommand;
use syncpanel_core::config::{Config, VALID_LOG_LEVELS};
use tracing::info;

use super::Context;

const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("agent.url", "Base URL of the sync agent"),
    ("agent.user", "User for the agent's HTTP authentication"),
    ("agent.password", "Password for the agent's HTTP authentication"),
    ("agent.timeout_secs", "Per-request timeout (seconds)"),
    ("polling.jobs_interval_ms", "Job list poll interval"),
    ("polling.logs_interval_ms", "Log poll interval"),
    ("polling.conflicts_interval_ms", "Conflict poll interval"),
    ("polling.backoff_ms", "Delay after the agent stops answering"),
    ("polling.job_watch_interval_ms", "Poll interval while watching a new job"),
    ("logging.level", "trace|debug|info|warn|error"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "polling.jobs_interval_ms")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Set { key, value } => self.execute_set(key, value, ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.config();

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(redacted(&config))
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&redacted(&config))
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_set(&self, key: &str, value: &str, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.config();
        let shown = if key == "agent.password" { "********" } else { value };

        info!(key = %key, value = %shown, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, help) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {:<32} - {}", name, help));
                }
            }
            return Ok(());
        }

        let errors: Vec<String> = config.validate().iter().map(|e| e.to_string()).collect();
        if !errors.is_empty() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "errors": errors,
                }));
            } else {
                formatter.error(&format!("Invalid value for '{}': {}", key, errors.join("; ")));
            }
            return Ok(());
        }

        config
            .save(&ctx.config_path)
            .context("Failed to write configuration file")?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": shown,
                "config_path": ctx.config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, shown));
            formatter.info(&format!("Saved to {}", ctx.config_path.display()));
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = &ctx.config_path;

        // Load explicitly, not load_or_default
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                if !config_path.exists() {
                    if ctx.is_json() {
                        formatter.print_json(&serde_json::json!({
                            "valid": false,
                            "config_path": config_path.display().to_string(),
                            "errors": ["Configuration file not found. Using defaults."],
                        }));
                    } else {
                        formatter.info(&format!(
                            "Configuration file not found at {}",
                            config_path.display()
                        ));
                        formatter.info("Using default configuration. Run 'syncpanel config set <key> <value>' to create one.");
                    }
                    return Ok(());
                }

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {}", e)],
                    }));
                } else {
                    formatter.error(&format!("Failed to parse configuration: {}", e));
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

/// Copy of `config` safe to print.
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.agent.password.is_some() {
        config.agent.password = Some("********".to_string());
    }
    config
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn unsigned(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("Expected a positive integer for {}", key))
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- agent ---
        "agent.url" => config.agent.url = value.trim_end_matches('/').to_string(),
        "agent.user" => config.agent.user = optional(value),
        "agent.password" => config.agent.password = optional(value),
        "agent.timeout_secs" => config.agent.timeout_secs = unsigned(key, value)?,

        // --- polling ---
        "polling.jobs_interval_ms" => config.polling.jobs_interval_ms = unsigned(key, value)?,
        "polling.logs_interval_ms" => config.polling.logs_interval_ms = unsigned(key, value)?,
        "polling.conflicts_interval_ms" => {
            config.polling.conflicts_interval_ms = unsigned(key, value)?
        }
        "polling.backoff_ms" => config.polling.backoff_ms = unsigned(key, value)?,
        "polling.job_watch_interval_ms" => {
            config.polling.job_watch_interval_ms = unsigned(key, value)?
        }

        // --- logging ---
        "logging.level" => {
            let level = value.to_lowercase();
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                anyhow::bail!(
                    "Invalid level '{}', expected one of: {}",
                    value,
                    VALID_LOG_LEVELS.join(", ")
                );
            }
            config.logging.level = level;
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}
