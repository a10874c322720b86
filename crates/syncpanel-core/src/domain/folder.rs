//! Remote folder nodes
//!
//! Returned by `GET /folders/...`. Children are loaded lazily, so a node's
//! `tree` is `None` until the agent has been asked for them; `Some(vec![])`
//! means the folder is known to be empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One remote directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Absolute remote path, e.g. `/projects/2024`
    #[serde(rename = "@filename")]
    pub path: String,
    /// Display name
    #[serde(rename = "@text", default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Vec<FolderNode>>,
    /// Marks the unsaved "new folder" entry; never sent to or read from the agent
    #[serde(skip)]
    pub placeholder: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderNode {
    /// A node whose children have not been fetched.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            tree: None,
            placeholder: false,
            extra: Map::new(),
        }
    }

    /// Sets the children, marking the node as loaded.
    pub fn with_children(mut self, children: Vec<FolderNode>) -> Self {
        self.tree = Some(children);
        self
    }

    /// True once the children have been fetched, even if there are none.
    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    /// The last segment of the node's path.
    pub fn basename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Body of a folder listing: either nodes or a single-element error array
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FolderListing {
    Error([FolderListingError; 1]),
    Nodes(Vec<FolderNode>),
}

/// The `{"error": "..."}` element the agent returns when listing fails
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderListingError {
    pub error: String,
}
