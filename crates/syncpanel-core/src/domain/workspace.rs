//! Remote workspaces and endpoint resolution

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::wire;

/// A named storage area exposed by the file server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(rename = "@repositorySlug", default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "@access_type", default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(
        rename = "@meta_syncable_REPO_SYNCABLE",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub syncable: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workspace {
    /// True when the workspace has a slug and the server flags it as syncable.
    pub fn is_syncable(&self) -> bool {
        self.slug.is_some() && self.syncable.as_deref() == Some("true")
    }

    /// Two-letter badge: `my-files` gives `MF`, `common` gives `CO`.
    pub fn badge(&self) -> String {
        badge_for(self.slug.as_deref().unwrap_or(&self.label))
    }
}

/// Two-letter badge for a workspace identifier.
pub fn badge_for(input: &str) -> String {
    if input.is_empty() {
        return "?¿".to_string();
    }
    let chars: Vec<char> = input.chars().collect();
    let badge: String = match chars.iter().position(|c| *c == '-') {
        Some(pos) if pos + 1 < chars.len() => [chars[0], chars[pos + 1]].iter().collect(),
        _ => chars.iter().take(2).collect(),
    };
    badge.to_uppercase()
}

/// `repositories` element of a workspace listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repositories {
    #[serde(default, deserialize_with = "wire::one_or_many")]
    pub repo: Vec<Workspace>,
}

/// Body of `GET /ws/request?...`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_display_name: Option<String>,
    #[serde(default)]
    pub repositories: Repositories,
}

impl WorkspaceListing {
    /// Workspaces that can be used as a sync target.
    pub fn syncable(&self) -> Vec<Workspace> {
        self.repositories
            .repo
            .iter()
            .filter(|w| w.is_syncable())
            .cloned()
            .collect()
    }
}

/// One server address returned by `GET /resolve/:client_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /resolve/:client_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointResolution {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Branding information (colors, application name, splash image)
    #[serde(default)]
    pub vanity: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EndpointResolution {
    /// The server URL to use for a new job.
    pub fn primary_url(&self) -> Option<&str> {
        self.endpoints.first().map(|e| e.url.as_str())
    }
}
