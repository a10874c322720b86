//! Syncpanel Cache - Remote folder tree
//!
//! In-memory cache of a workspace's remote folders for the "choose remote
//! folder" picker:
//! - Partially loaded: a node's children are fetched only when it is expanded
//! - Targeted mutation: fetched children are spliced in place
//! - A single synthetic "new folder" placeholder can be added and discarded
//!   without contacting the agent
//!
//! ## Key Components
//!
//! - [`FolderTree`] - The tree itself; pure, no I/O
//! - [`FolderBrowser`] - Drives a [`FolderTree`] through the agent port
//! - [`TreeError`] / [`BrowseError`] - Error types

pub mod browser;
pub mod folder_tree;

pub use browser::{BrowseError, FolderBrowser};
pub use folder_tree::{FolderTree, TreeError, PLACEHOLDER_NAME};
