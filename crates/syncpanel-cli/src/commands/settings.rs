//! Settings and proxy commands - View and change agent-wide settings
//!
//! Provides the `syncpanel settings` and `syncpanel proxy` CLI commands which:
//! 1. Show the whole document, or one dotted key of it
//! 2. Set one dotted key and write the document back to the agent

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;
use syncpanel_core::{
    domain::{GeneralConfigs, ProxySettings},
    ports::{AgentResult, IAgentApi},
};
use tracing::info;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the agent's general settings
    Show {
        /// Dotted key, e.g. `update_info.enable_update_check`
        key: Option<String>,
    },
    /// Change one general setting
    Set {
        /// Dotted key, e.g. `update_info.enable_update_check`
        key: String,
        /// New value; parsed as JSON when possible
        value: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProxyCommand {
    /// Show the agent's proxy settings
    Show {
        /// Dotted key, e.g. `https.hostname`
        key: Option<String>,
    },
    /// Change one proxy setting
    Set {
        /// Dotted key, e.g. `https.hostname`
        key: String,
        /// New value; parsed as JSON when possible
        value: String,
    },
}

/// One of the agent's settings documents
#[derive(Debug, Clone, PartialEq)]
enum Document {
    General(GeneralConfigs),
    Proxy(ProxySettings),
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    General,
    Proxy,
}

impl Kind {
    fn title(self) -> &'static str {
        match self {
            Kind::General => "General settings",
            Kind::Proxy => "Proxy settings",
        }
    }

    async fn fetch(self, api: &dyn IAgentApi) -> AgentResult<Document> {
        match self {
            Kind::General => Ok(Document::General(api.general_configs().await?.normalize())),
            Kind::Proxy => Ok(Document::Proxy(api.proxy().await?)),
        }
    }
}

impl Document {
    fn get_path(&self, key: &str) -> Option<&Value> {
        match self {
            Document::General(configs) => configs.get_path(key),
            Document::Proxy(proxy) => proxy.get_path(key),
        }
    }

    fn set_path(&mut self, key: &str, value: Value) {
        match self {
            Document::General(configs) => configs.set_path(key, value),
            Document::Proxy(proxy) => proxy.set_path(key, value),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Document::General(configs) => Value::Object(configs.0.clone()),
            Document::Proxy(proxy) => Value::Object(proxy.0.clone()),
        }
    }

    async fn store(&self, api: &dyn IAgentApi) -> AgentResult<Document> {
        match self {
            Document::General(configs) => Ok(Document::General(
                api.update_general_configs(configs).await?.normalize(),
            )),
            Document::Proxy(proxy) => Ok(Document::Proxy(api.update_proxy(proxy).await?)),
        }
    }
}

/// JSON literal when it parses as one, otherwise the raw string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl SettingsCommand {
    /// Execute the settings command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        match self {
            SettingsCommand::Show { key } => show(api, Kind::General, key.as_deref(), ctx).await,
            SettingsCommand::Set { key, value } => set(api, Kind::General, key, value, ctx).await,
        }
    }
}

impl ProxyCommand {
    /// Execute the proxy command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        match self {
            ProxyCommand::Show { key } => show(api, Kind::Proxy, key.as_deref(), ctx).await,
            ProxyCommand::Set { key, value } => set(api, Kind::Proxy, key, value, ctx).await,
        }
    }
}

async fn show(api: Arc<dyn IAgentApi>, kind: Kind, key: Option<&str>, ctx: &Context) -> Result<()> {
    let formatter = ctx.formatter();
    let document = match kind.fetch(api.as_ref()).await {
        Ok(document) => document,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    let value = match key {
        None => document.to_json(),
        Some(key) => match document.get_path(key) {
            Some(value) => value.clone(),
            None => {
                formatter.error(&format!("No setting named '{}'", key));
                return Ok(());
            }
        },
    };

    if ctx.is_json() {
        formatter.print_json(&value);
        return Ok(());
    }

    match key {
        Some(key) => formatter.success(&format!("{} = {}", key, value)),
        None => {
            formatter.success(kind.title());
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_default();
            for line in pretty.lines() {
                formatter.info(line);
            }
        }
    }
    Ok(())
}

async fn set(
    api: Arc<dyn IAgentApi>,
    kind: Kind,
    key: &str,
    raw: &str,
    ctx: &Context,
) -> Result<()> {
    let formatter = ctx.formatter();
    let mut document = match kind.fetch(api.as_ref()).await {
        Ok(document) => document,
        Err(e) => {
            formatter.error(&e.user_message());
            return Ok(());
        }
    };

    let value = parse_value(raw);
    document.set_path(key, value.clone());

    let stored = match document.store(api.as_ref()).await {
        Ok(stored) => stored,
        Err(e) => {
            formatter.error(&format!("Failed to save '{}': {}", key, e.user_message()));
            return Ok(());
        }
    };

    info!(key = %key, "Agent setting updated");

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "key": key,
            "value": stored.get_path(key),
        }));
    } else {
        formatter.success(&format!("Set {} = {}", key, value));
    }
    Ok(())
}
