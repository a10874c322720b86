//! Sync agent HTTP client
//!
//! Wraps `reqwest::Client` with base URL construction, the agent's optional
//! basic authentication and the error classification the poller depends on:
//! no response at all is [`AgentError::Unreachable`], any response with an
//! error status is [`AgentError::Server`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use syncpanel_agent::AgentClient;
//! use syncpanel_core::ports::IAgentApi;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = AgentClient::new("http://localhost:5556")?;
//! let listing = client.list_jobs().await?;
//! println!("{} jobs", listing.jobs.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use syncpanel_core::{
    config::AgentConfig,
    ports::{AgentError, AgentResult},
};
use tracing::{debug, warn};
use url::Url;

/// Default agent address
pub const DEFAULT_AGENT_URL: &str = "http://localhost:5556";

// ============================================================================
// AgentClient
// ============================================================================

/// HTTP client for the agent's REST API
#[derive(Debug, Clone)]
pub struct AgentClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL, e.g. `http://localhost:5556/`
    base_url: Url,
    /// Basic-auth credentials for the agent itself
    auth: Option<(String, Option<String>)>,
}

impl AgentClient {
    /// Creates a client for the agent at `base_url` with default settings.
    pub fn new(base_url: &str) -> AgentResult<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
            auth: None,
        })
    }

    /// Creates a client from the `agent` section of the configuration.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AgentError::InvalidUrl(e.to_string()))?;

        let auth = config
            .user
            .as_ref()
            .map(|user| (user.clone(), config.password.clone()));

        Ok(Self {
            client,
            base_url: parse_base_url(&config.url)?,
            auth,
        })
    }

    /// Sets basic-auth credentials sent with every request.
    pub fn with_basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.auth = Some((user.into(), password));
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an absolute URL from path segments.
    ///
    /// Segments are percent-encoded, so job ids containing `/` or spaces are
    /// addressed as a single segment.
    pub fn url(&self, segments: &[&str]) -> AgentResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AgentError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a request builder for the given method and path segments.
    pub fn request(&self, method: Method, segments: &[&str]) -> AgentResult<RequestBuilder> {
        let url = self.url(segments)?;
        let builder = self.client.request(method, url);
        Ok(match &self.auth {
            Some((user, password)) => builder.basic_auth(user, password.as_ref()),
            None => builder,
        })
    }

    /// Sends a request and classifies the outcome.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> AgentResult<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                AgentError::InvalidUrl(e.to_string())
            } else {
                warn!(error = %e, "Agent unreachable");
                AgentError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        debug!(status = status.as_u16(), %message, "Agent returned an error status");
        Err(AgentError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends a request and decodes the JSON body.
    ///
    /// A successful response whose body is exactly `{"error": "..."}` is
    /// reported as [`AgentError::Server`].
    pub(crate) async fn json_value(&self, builder: RequestBuilder) -> AgentResult<Value> {
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;

        if let Some(message) = embedded_error(&value) {
            return Err(AgentError::Server { status, message });
        }
        Ok(value)
    }

    /// Like [`json_value`](Self::json_value), then deserializes into `T`.
    pub(crate) async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AgentResult<T> {
        let value = self.json_value(builder).await?;
        decode(value)
    }

    /// Sends a request and discards the body.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> AgentResult<()> {
        self.send(builder).await.map(|_| ())
    }
}

fn parse_base_url(raw: &str) -> AgentResult<Url> {
    let url = Url::parse(raw).map_err(|e| AgentError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AgentError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Deserializes a JSON value, mapping failures to [`AgentError::InvalidResponse`].
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> AgentResult<T> {
    serde_json::from_value(value).map_err(|e| AgentError::InvalidResponse(e.to_string()))
}

/// `error` or `message` from a JSON error body, or the trimmed raw body.
fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let field = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = field {
            return Some(message.to_string());
        }
        if let Some(message) = value.as_str() {
            return Some(message.to_string());
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn embedded_error(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get("error").and_then(Value::as_str).map(str::to_string)
}
