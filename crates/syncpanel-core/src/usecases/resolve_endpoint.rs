//! Client id resolution use case
//!
//! A short client id handed out by the server operator is resolved by the
//! agent into the server URL (and branding) used to pre-fill a new job.

use std::sync::Arc;

use crate::{
    domain::{DomainError, EndpointResolution},
    ports::{AgentError, AgentResult, IAgentApi},
};

pub struct ResolveEndpointUseCase {
    api: Arc<dyn IAgentApi>,
}

impl ResolveEndpointUseCase {
    pub fn new(api: Arc<dyn IAgentApi>) -> Self {
        Self { api }
    }

    /// Resolves `client_id`; the result is guaranteed to hold at least one endpoint.
    pub async fn execute(&self, client_id: &str) -> AgentResult<EndpointResolution> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(DomainError::EmptyClientId.into());
        }
        let resolution = self.api.resolve_client_id(client_id).await?;
        if resolution.primary_url().is_none() {
            return Err(AgentError::InvalidResponse(format!(
                "no endpoint returned for client id '{client_id}'"
            )));
        }
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::StubAgent;

    #[tokio::test]
    async fn test_empty_client_id_rejected_locally() {
        let stub = Arc::new(StubAgent::new());
        let usecase = ResolveEndpointUseCase::new(stub.clone());
        let err = usecase.execute("  ").await.unwrap_err();
        assert!(matches!(err, AgentError::Rejected(DomainError::EmptyClientId)));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_without_endpoint_is_invalid() {
        let stub = Arc::new(StubAgent::new());
        let usecase = ResolveEndpointUseCase::new(stub);
        let err = usecase.execute("acme").await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_resolves_first_endpoint() {
        let stub = Arc::new(StubAgent::with(|s| {
            s.endpoints = serde_json::from_value(json!({
                "endpoints": [{"url": "https://acme.example.com"}, {"url": "https://backup.example.com"}]
            }))
            .unwrap();
        }));
        let usecase = ResolveEndpointUseCase::new(stub);
        let res = usecase.execute("acme").await.unwrap();
        assert_eq!(res.primary_url(), Some("https://acme.example.com"));
    }
}
