//! Public share links

use serde::{Deserialize, Serialize};

use super::wire;

/// Options for creating a share link on a synced item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    /// Path of the item relative to the job's local directory
    pub relative_path: String,
    pub description: String,
    /// Optional password protecting the link
    pub password: String,
    /// Days before the link expires, 0 for never
    pub expiration_days: u32,
    /// Allowed downloads, 0 for unlimited
    pub downloads: u32,
    pub can_read: bool,
    pub can_download: bool,
    /// Upload permission; meaningful for folders only
    pub can_write: bool,
    /// Custom link slug
    pub link_handler: Option<String>,
}

impl ShareRequest {
    /// Defaults used by the share dialog: preview and download allowed.
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            description: String::new(),
            password: String::new(),
            expiration_days: 0,
            downloads: 0,
            can_read: true,
            can_download: true,
            can_write: false,
            link_handler: None,
        }
    }

    /// Label of the share, the item's file name.
    pub fn label(&self) -> &str {
        self.relative_path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Query string pairs for `GET /share/:job_id`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", "share".to_string()),
            ("ws_label", self.label().to_string()),
            ("ws_description", self.description.clone()),
            ("password", self.password.clone()),
            ("expiration", self.expiration_days.to_string()),
            ("downloads", self.downloads.to_string()),
            ("can_read", self.can_read.to_string()),
            ("can_download", self.can_download.to_string()),
            ("relative_path", self.relative_path.clone()),
            ("link_handler", self.link_handler.clone().unwrap_or_default()),
            ("can_write", self.can_write.to_string()),
        ]
    }
}

/// Body returned by share and share-check requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    #[serde(default)]
    pub link: String,
    #[serde(rename = "existingLinkFlag", default, deserialize_with = "wire::lenient_bool")]
    pub existing: bool,
}

impl ShareLink {
    /// The agent reports failures in the `link` field; a real link is a URL.
    pub fn is_url(&self) -> bool {
        self.link.starts_with("http")
    }
}
