//! Lazy folder browsing through the agent
//!
//! [`FolderBrowser`] owns a [`FolderTree`] for one workspace and fetches a
//! node's children the first time it is expanded.

use std::sync::Arc;

use syncpanel_core::domain::FolderNode;
use syncpanel_core::ports::{AgentError, FolderQuery, IAgentApi, RemoteTarget};
use thiserror::Error;
use tracing::{debug, info};

use crate::folder_tree::{FolderTree, TreeError};

/// Errors returned by [`FolderBrowser`]
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The folder listing request failed
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// The requested node is not in the cached tree
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Remote folder picker state for one workspace
pub struct FolderBrowser {
    api: Arc<dyn IAgentApi>,
    target: RemoteTarget,
    workspace: String,
    tree: FolderTree,
}

impl FolderBrowser {
    pub fn new(api: Arc<dyn IAgentApi>, target: RemoteTarget, workspace: impl Into<String>) -> Self {
        Self {
            api,
            target,
            workspace: workspace.into(),
            tree: FolderTree::default(),
        }
    }

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FolderTree {
        &mut self.tree
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Fetches the workspace's top-level folders, discarding the cached tree.
    pub async fn load_roots(&mut self) -> Result<&[FolderNode], BrowseError> {
        let roots = self.fetch(None).await?;
        info!(workspace = %self.workspace, roots = roots.len(), "Loaded folder roots");
        self.tree.set_roots(roots);
        Ok(self.tree.roots())
    }

    /// Returns the node at `path`, fetching its children if never loaded.
    pub async fn expand(&mut self, path: &str) -> Result<&FolderNode, BrowseError> {
        if self.tree.needs_fetch(path)? {
            self.refresh(path).await?;
        }
        Ok(self.tree.locate(path)?)
    }

    /// Fetches the children of `path` again, replacing the cached ones.
    pub async fn refresh(&mut self, path: &str) -> Result<(), BrowseError> {
        let children = self.fetch(Some(path)).await?;
        self.tree.attach_children(path, unwrap_listing(path, children))?;
        Ok(())
    }

    /// Expands every ancestor of `path`, then `path` itself.
    ///
    /// Loads the roots first when the tree is empty.
    pub async fn reveal(&mut self, path: &str) -> Result<&FolderNode, BrowseError> {
        if self.tree.is_empty() {
            self.load_roots().await?;
        }
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);
            self.expand(&prefix).await?;
        }
        Ok(self.tree.locate(path)?)
    }

    async fn fetch(&self, subdir: Option<&str>) -> Result<Vec<FolderNode>, AgentError> {
        debug!(workspace = %self.workspace, subdir = ?subdir, "Listing folders");
        self.api
            .list_folders(&FolderQuery {
                target: self.target.clone(),
                workspace: self.workspace.clone(),
                subdir: subdir.map(str::to_string),
            })
            .await
    }
}

/// Some agents answer a sub-directory listing with the directory itself
/// wrapping its children; unwrap that form.
fn unwrap_listing(path: &str, mut nodes: Vec<FolderNode>) -> Vec<FolderNode> {
    let wanted = path.trim_end_matches('/');
    if nodes.len() == 1 && nodes[0].path.trim_end_matches('/') == wanted {
        if let Some(children) = nodes.pop().and_then(|n| n.tree) {
            return children;
        }
        return Vec::new();
    }
    nodes
}
