//! Folder-tree cache
//!
//! Nodes are addressed by absolute path. A lookup starts at the root whose
//! path is the first segment and descends through `tree`, matching the
//! cumulative prefix at each level (`/a`, then `/a/b`, then `/a/b/c`).
//! A node with `tree == None` has not been fetched; lookups below it fail
//! rather than trigger a fetch.
//!
//! At most one placeholder exists at a time. Its parent path is recorded so
//! that it can be spliced out again, and so that a parent which was unloaded
//! before the placeholder was added goes back to being unloaded.

use syncpanel_core::domain::FolderNode;
use thiserror::Error;
use tracing::debug;

/// Display name of the synthetic "new folder" node
pub const PLACEHOLDER_NAME: &str = "New Folder";

/// Errors returned by [`FolderTree`] lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node has this path, or one of its ancestors has not been loaded
    #[error("Folder not found: {0}")]
    NotFound(String),

    /// The path has no segments
    #[error("Empty folder path")]
    EmptyPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    /// Normalized parent path; empty for a root-level placeholder
    parent: String,
    parent_was_unloaded: bool,
}

/// A partially loaded tree of remote folders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderTree {
    roots: Vec<FolderNode>,
    placeholder: Option<Placeholder>,
}

impl FolderTree {
    pub fn new(roots: Vec<FolderNode>) -> Self {
        Self {
            roots,
            placeholder: None,
        }
    }

    pub fn roots(&self) -> &[FolderNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Replaces the whole tree, e.g. after another workspace was chosen.
    pub fn set_roots(&mut self, roots: Vec<FolderNode>) {
        self.roots = roots;
        self.placeholder = None;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Finds the node at `path`.
    pub fn locate(&self, path: &str) -> Result<&FolderNode, TreeError> {
        let segments = segments(path);
        let (first, rest) = segments.split_first().ok_or(TreeError::EmptyPath)?;
        let not_found = || TreeError::NotFound(path.to_string());

        let mut prefix = format!("/{first}");
        let mut node = find_in(&self.roots, &prefix).ok_or_else(not_found)?;
        for segment in rest {
            prefix.push('/');
            prefix.push_str(segment);
            let children = node.tree.as_deref().ok_or_else(not_found)?;
            node = find_in(children, &prefix).ok_or_else(not_found)?;
        }
        Ok(node)
    }

    /// Mutable variant of [`locate`](Self::locate).
    pub fn locate_mut(&mut self, path: &str) -> Result<&mut FolderNode, TreeError> {
        let segments = segments(path);
        let (first, rest) = segments.split_first().ok_or(TreeError::EmptyPath)?;
        let not_found = || TreeError::NotFound(path.to_string());

        let mut prefix = format!("/{first}");
        let mut node = find_in_mut(&mut self.roots, &prefix).ok_or_else(not_found)?;
        for segment in rest {
            prefix.push('/');
            prefix.push_str(segment);
            let children = node.tree.as_deref_mut().ok_or_else(not_found)?;
            node = find_in_mut(children, &prefix).ok_or_else(not_found)?;
        }
        Ok(node)
    }

    /// True when the node at `path` exists but its children were never fetched.
    ///
    /// A parent that only holds the placeholder because it was added while
    /// the parent was unloaded still needs a fetch.
    pub fn needs_fetch(&self, path: &str) -> Result<bool, TreeError> {
        if !self.locate(path)?.is_loaded() {
            return Ok(true);
        }
        Ok(self.holds_unfetched_placeholder(&normalize(path)))
    }

    fn holds_unfetched_placeholder(&self, parent: &str) -> bool {
        self.placeholder
            .as_ref()
            .is_some_and(|p| p.parent_was_unloaded && p.parent == parent)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Sets the children of the node at `path`, replacing any previous list.
    ///
    /// A placeholder inside the replaced subtree is dropped with it, unless
    /// this is the first load of the placeholder's parent: then it is kept
    /// after the fetched children.
    pub fn attach_children(
        &mut self,
        path: &str,
        mut children: Vec<FolderNode>,
    ) -> Result<(), TreeError> {
        let target = normalize(path);
        let first_load = self.holds_unfetched_placeholder(&target);

        let node = self.locate_mut(path)?;
        debug!(path = %node.path, children = children.len(), "Attaching folder children");
        if first_load {
            children.extend(node.tree.take().into_iter().flatten().filter(|n| n.placeholder));
        }
        node.tree = Some(children);

        if first_load {
            if let Some(placeholder) = self.placeholder.as_mut() {
                placeholder.parent_was_unloaded = false;
            }
        } else if self
            .placeholder
            .as_ref()
            .is_some_and(|p| is_within(&p.parent, &target))
        {
            self.placeholder = None;
        }
        Ok(())
    }

    /// Appends a placeholder under `parent_path` and returns it.
    ///
    /// An empty path or `/` adds it at root level. Any previous placeholder
    /// is removed first.
    pub fn create_placeholder(&mut self, parent_path: &str) -> Result<&mut FolderNode, TreeError> {
        self.remove_placeholder();

        let parent = normalize(parent_path);
        let parent_was_unloaded = if parent.is_empty() {
            false
        } else {
            !self.locate(&parent)?.is_loaded()
        };

        let mut node = FolderNode::new(format!("{parent}/{PLACEHOLDER_NAME}"), PLACEHOLDER_NAME)
            .with_children(Vec::new());
        node.placeholder = true;

        self.placeholder = Some(Placeholder {
            parent: parent.clone(),
            parent_was_unloaded,
        });
        let container = self.container_mut(&parent)?;
        let index = container.len();
        container.push(node);
        Ok(&mut container[index])
    }

    /// Splices the placeholder out of its parent. Returns whether one was removed.
    pub fn remove_placeholder(&mut self) -> bool {
        let Some(placeholder) = self.placeholder.take() else {
            return false;
        };

        if placeholder.parent.is_empty() {
            let before = self.roots.len();
            self.roots.retain(|n| !n.placeholder);
            return self.roots.len() != before;
        }

        let Ok(parent) = self.locate_mut(&placeholder.parent) else {
            debug!(parent = %placeholder.parent, "Placeholder parent no longer in tree");
            return false;
        };
        let Some(children) = parent.tree.as_mut() else {
            return false;
        };
        let before = children.len();
        children.retain(|n| !n.placeholder);
        let removed = children.len() != before;
        if placeholder.parent_was_unloaded && children.is_empty() {
            parent.tree = None;
        }
        removed
    }

    /// The current placeholder, if any.
    pub fn placeholder(&self) -> Option<&FolderNode> {
        let placeholder = self.placeholder.as_ref()?;
        let siblings = if placeholder.parent.is_empty() {
            &self.roots[..]
        } else {
            self.locate(&placeholder.parent).ok()?.tree.as_deref()?
        };
        siblings.iter().find(|n| n.placeholder)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Every node in display order with its depth (roots are depth 0).
    pub fn depth_first(&self) -> Vec<(usize, &FolderNode)> {
        let mut out = Vec::new();
        for root in &self.roots {
            visit(root, 0, &mut out);
        }
        out
    }

    fn container_mut(&mut self, parent: &str) -> Result<&mut Vec<FolderNode>, TreeError> {
        if parent.is_empty() {
            return Ok(&mut self.roots);
        }
        let node = self.locate_mut(parent)?;
        Ok(node.tree.get_or_insert_with(Vec::new))
    }
}

fn visit<'a>(node: &'a FolderNode, depth: usize, out: &mut Vec<(usize, &'a FolderNode)>) {
    out.push((depth, node));
    for child in node.tree.iter().flatten() {
        visit(child, depth + 1, out);
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// `/a/b` for `a/b/`, `/a//b` or `/a/b`; empty for the root.
fn normalize(path: &str) -> String {
    segments(path)
        .iter()
        .fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(segment);
            acc
        })
}

fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn find_in<'a>(nodes: &'a [FolderNode], path: &str) -> Option<&'a FolderNode> {
    nodes.iter().find(|n| normalize(&n.path) == path)
}

fn find_in_mut<'a>(nodes: &'a mut [FolderNode], path: &str) -> Option<&'a mut FolderNode> {
    nodes.iter_mut().find(|n| normalize(&n.path) == path)
}
