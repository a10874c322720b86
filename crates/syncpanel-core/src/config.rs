//! Configuration module for syncpanel.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for syncpanel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

/// Where the local sync agent listens and how to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the agent's HTTP API.
    pub url: String,
    /// Username for the agent's own HTTP authentication, if enabled.
    pub user: Option<String>,
    /// Password for the agent's own HTTP authentication, if enabled.
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Poll cadences, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between job-list polls.
    pub jobs_interval_ms: u64,
    /// Interval between log polls for the selected job.
    pub logs_interval_ms: u64,
    /// Interval between conflict polls for the selected job.
    pub conflicts_interval_ms: u64,
    /// Delay used by every stream after a connectivity failure.
    pub backoff_ms: u64,
    /// Interval used when watching a single job until it goes idle.
    pub job_watch_interval_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when neither `RUST_LOG` nor `-v` is given.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/syncpanel/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("syncpanel")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5556".to_string(),
            user: None,
            password: None,
            timeout_secs: 20,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            jobs_interval_ms: 2000,
            logs_interval_ms: 2000,
            conflicts_interval_ms: 3000,
            backoff_ms: 20000,
            job_watch_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingConfig {
    pub fn jobs_interval(&self) -> Duration {
        Duration::from_millis(self.jobs_interval_ms)
    }

    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms)
    }

    pub fn conflicts_interval(&self) -> Duration {
        Duration::from_millis(self.conflicts_interval_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn job_watch_interval(&self) -> Duration {
        Duration::from_millis(self.job_watch_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"polling.jobs_interval_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- agent ---
        match url::Url::parse(&self.agent.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError {
                field: "agent.url".into(),
                message: format!("unsupported scheme: {}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "agent.url".into(),
                message: format!("not a valid URL: {e}"),
            }),
        }
        if self.agent.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "agent.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- polling ---
        let intervals = [
            ("polling.jobs_interval_ms", self.polling.jobs_interval_ms),
            ("polling.logs_interval_ms", self.polling.logs_interval_ms),
            (
                "polling.conflicts_interval_ms",
                self.polling.conflicts_interval_ms,
            ),
            (
                "polling.job_watch_interval_ms",
                self.polling.job_watch_interval_ms,
            ),
        ];
        for (field, value) in intervals {
            if value == 0 {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must be greater than 0".into(),
                });
            }
        }
        if self.polling.backoff_ms == 0 {
            errors.push(ValidationError {
                field: "polling.backoff_ms".into(),
                message: "must be greater than 0".into(),
            });
        } else if let Some((field, value)) = intervals
            .iter()
            .filter(|(_, value)| *value > self.polling.backoff_ms)
            .max_by_key(|(_, value)| *value)
        {
            errors.push(ValidationError {
                field: "polling.backoff_ms".into(),
                message: format!(
                    "must not be shorter than {field} ({value} ms)",
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use syncpanel_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .agent_url("http://localhost:5556")
///     .jobs_interval_ms(5000)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- agent ---

    pub fn agent_url(mut self, url: impl Into<String>) -> Self {
        self.config.agent.url = url.into();
        self
    }

    pub fn agent_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.agent.user = Some(user.into());
        self.config.agent.password = Some(password.into());
        self
    }

    pub fn agent_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.agent.timeout_secs = seconds;
        self
    }

    // --- polling ---

    pub fn jobs_interval_ms(mut self, ms: u64) -> Self {
        self.config.polling.jobs_interval_ms = ms;
        self
    }

    pub fn logs_interval_ms(mut self, ms: u64) -> Self {
        self.config.polling.logs_interval_ms = ms;
        self
    }

    pub fn conflicts_interval_ms(mut self, ms: u64) -> Self {
        self.config.polling.conflicts_interval_ms = ms;
        self
    }

    pub fn backoff_ms(mut self, ms: u64) -> Self {
        self.config.polling.backoff_ms = ms;
        self
    }

    pub fn job_watch_interval_ms(mut self, ms: u64) -> Self {
        self.config.polling.job_watch_interval_ms = ms;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
