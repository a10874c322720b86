//! Endpoint command - Resolve a client id into a server address

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use syncpanel_core::{ports::IAgentApi, usecases::ResolveEndpointUseCase};
use tracing::info;

use super::Context;

#[derive(Debug, Args)]
pub struct EndpointCommand {
    /// Client id handed out by the server operator
    pub client_id: String,
}

impl EndpointCommand {
    /// Execute the endpoint command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let api = ctx.agent()?;
        self.run(api, ctx).await
    }

    pub(crate) async fn run(&self, api: Arc<dyn IAgentApi>, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let resolution = match ResolveEndpointUseCase::new(api).execute(&self.client_id).await {
            Ok(resolution) => resolution,
            Err(e) => {
                formatter.error(&e.user_message());
                return Ok(());
            }
        };

        let url = resolution.primary_url().unwrap_or_default();
        info!(client_id = %self.client_id, url = %url, "Client id resolved");

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "client_id": self.client_id.trim(),
                "url": url,
                "endpoints": resolution.endpoints.iter().map(|e| &e.url).collect::<Vec<_>>(),
                "vanity": resolution.vanity,
            }));
            return Ok(());
        }

        formatter.success(url);
        for other in resolution.endpoints.iter().skip(1) {
            formatter.info(&format!("Alternative: {}", other.url));
        }
        if let Some(name) = resolution.vanity.get("application_title").and_then(|v| v.as_str()) {
            formatter.info(&format!("Application: {}", name));
        }
        formatter.info(&format!("Use it with: syncpanel new --server {}", url));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use syncpanel_core::testing::StubAgent;

    use super::*;
    use crate::output::OutputFormat;

    fn ctx() -> Context {
        Context::new(OutputFormat::Human, true, PathBuf::from("/nonexistent"))
    }

    #[tokio::test]
    async fn test_blank_client_id_never_reaches_agent() {
        let stub = Arc::new(StubAgent::new());
        let cmd = EndpointCommand {
            client_id: "   ".into(),
        };
        cmd.run(stub.clone(), &ctx()).await.unwrap();
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolves_trimmed_client_id() {
        let stub = Arc::new(StubAgent::with(|s| {
            s.endpoints = serde_json::from_value(json!({
                "endpoints": [{"url": "https://acme.example.com"}],
                "vanity": {"application_title": "Acme Files"}
            }))
            .unwrap();
        }));
        let cmd = EndpointCommand {
            client_id: " acme ".into(),
        };
        cmd.run(stub.clone(), &ctx()).await.unwrap();
        assert_eq!(stub.calls(), vec!["resolve:acme"]);
    }
}
