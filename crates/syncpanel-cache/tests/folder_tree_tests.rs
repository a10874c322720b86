//! Integration tests for FolderTree
//!
//! Lookup, lazy attachment and the placeholder lifecycle, exercised through
//! the public API only.

use syncpanel_cache::{FolderTree, TreeError, PLACEHOLDER_NAME};
use syncpanel_core::domain::FolderNode;

// ============================================================================
// Test helpers
// ============================================================================

/// `/a` with a loaded, empty `/a/b`
fn small_tree() -> FolderTree {
    FolderTree::new(vec![
        FolderNode::new("/a", "a").with_children(vec![FolderNode::new("/a/b", "b").with_children(vec![])])
    ])
}

/// Two roots, one partially expanded
fn workspace_tree() -> FolderTree {
    FolderTree::new(vec![
        FolderNode::new("/projects", "projects").with_children(vec![
            FolderNode::new("/projects/2024", "2024"),
            FolderNode::new("/projects/2025", "2025").with_children(vec![FolderNode::new(
                "/projects/2025/q1",
                "q1",
            )]),
        ]),
        FolderNode::new("/photos", "photos"),
    ])
}

// ============================================================================
// locate
// ============================================================================

#[test]
fn test_locate_existing_child() {
    let tree = small_tree();
    let node = tree.locate("/a/b").expect("node /a/b");
    assert_eq!(node.path, "/a/b");
    assert_eq!(node.tree.as_deref(), Some(&[][..]));
}

#[test]
fn test_locate_missing_sibling() {
    let tree = small_tree();
    assert_eq!(
        tree.locate("/a/c").unwrap_err(),
        TreeError::NotFound("/a/c".into())
    );
}

#[test]
fn test_locate_requires_exact_root_segment() {
    let tree = small_tree();
    assert!(tree.locate("/ab").is_err());
    assert!(tree.locate("/a").is_ok());
}

#[test]
fn test_locate_below_unloaded_node_is_not_found() {
    let tree = workspace_tree();
    assert!(matches!(
        tree.locate("/projects/2024/jan"),
        Err(TreeError::NotFound(_))
    ));
    assert!(matches!(
        tree.locate("/photos/2020"),
        Err(TreeError::NotFound(_))
    ));
}

#[test]
fn test_locate_deep_node() {
    let tree = workspace_tree();
    assert_eq!(tree.locate("/projects/2025/q1").unwrap().name, "q1");
}

// ============================================================================
// attach_children / needs_fetch
// ============================================================================

#[test]
fn test_unloaded_and_empty_are_distinct() {
    let mut tree = workspace_tree();
    assert!(tree.needs_fetch("/photos").unwrap());

    tree.attach_children("/photos", vec![]).unwrap();
    assert!(!tree.needs_fetch("/photos").unwrap());
    assert_eq!(tree.locate("/photos").unwrap().tree, Some(vec![]));
}

#[test]
fn test_attach_children_replaces_previous_list() {
    let mut tree = workspace_tree();
    tree.attach_children(
        "/projects/2025",
        vec![
            FolderNode::new("/projects/2025/q2", "q2"),
            FolderNode::new("/projects/2025/q3", "q3"),
        ],
    )
    .unwrap();

    let names: Vec<_> = tree
        .locate("/projects/2025")
        .unwrap()
        .tree
        .as_ref()
        .unwrap()
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["q2", "q3"]);
    assert!(tree.locate("/projects/2025/q1").is_err());
}

#[test]
fn test_attach_children_to_missing_node_fails() {
    let mut tree = workspace_tree();
    let before = tree.clone();
    assert!(tree.attach_children("/music", vec![]).is_err());
    assert_eq!(tree, before);
}

#[test]
fn test_attached_children_become_addressable() {
    let mut tree = workspace_tree();
    tree.attach_children("/photos", vec![FolderNode::new("/photos/2020", "2020")])
        .unwrap();
    assert_eq!(tree.locate("/photos/2020").unwrap().basename(), "2020");
}

// ============================================================================
// Placeholder
// ============================================================================

#[test]
fn test_create_then_remove_placeholder_restores_tree() {
    let mut tree = small_tree();
    let original = tree.clone();

    let node = tree.create_placeholder("/a/b").unwrap();
    assert!(node.placeholder);
    assert_eq!(node.name, PLACEHOLDER_NAME);
    assert_ne!(tree, original);

    assert!(tree.remove_placeholder());
    assert_eq!(tree, original);
}

#[test]
fn test_placeholder_under_unloaded_parent_restores_unloaded_state() {
    let mut tree = workspace_tree();
    let original = tree.clone();

    tree.create_placeholder("/photos").unwrap();
    assert_eq!(tree.locate("/photos").unwrap().tree.as_ref().unwrap().len(), 1);

    tree.remove_placeholder();
    assert_eq!(tree, original);
    assert!(tree.needs_fetch("/photos").unwrap());
}

#[test]
fn test_placeholder_under_unloaded_parent_still_needs_fetch() {
    let mut tree = workspace_tree();
    tree.create_placeholder("/photos").unwrap();
    assert!(tree.needs_fetch("/photos").unwrap());
    assert!(!tree.needs_fetch("/projects").unwrap());

    tree.attach_children("/photos/", vec![FolderNode::new("/photos/2024", "2024")])
        .unwrap();
    assert!(!tree.needs_fetch("/photos").unwrap());

    let children = tree.locate("/photos").unwrap().tree.as_ref().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].path, "/photos/2024");
    assert!(children[1].placeholder);

    // Fetched children stay once the placeholder is gone
    assert!(tree.remove_placeholder());
    let children = tree.locate("/photos").unwrap().tree.as_ref().unwrap();
    assert_eq!(children.len(), 1);
    assert!(tree.placeholder().is_none());
}

#[test]
fn test_refreshing_loaded_parent_drops_placeholder() {
    let mut tree = workspace_tree();
    tree.create_placeholder("/projects").unwrap();

    tree.attach_children("/projects", vec![FolderNode::new("/projects/2026", "2026")])
        .unwrap();
    assert!(tree.placeholder().is_none());
    assert!(!tree.remove_placeholder());
    assert_eq!(tree.locate("/projects").unwrap().tree.as_ref().unwrap().len(), 1);
}

#[test]
fn test_placeholder_is_appended_after_real_children() {
    let mut tree = workspace_tree();
    tree.create_placeholder("/projects").unwrap();

    let children = tree.locate("/projects").unwrap().tree.as_ref().unwrap();
    assert_eq!(children.len(), 3);
    assert!(children[2].placeholder);
    assert!(!children[0].placeholder);
}

#[test]
fn test_only_one_placeholder_at_a_time() {
    let mut tree = workspace_tree();
    let original = tree.clone();

    tree.create_placeholder("/projects").unwrap();
    tree.create_placeholder("/projects/2025").unwrap();

    let placeholders = tree
        .depth_first()
        .into_iter()
        .filter(|(_, n)| n.placeholder)
        .count();
    assert_eq!(placeholders, 1);
    assert_eq!(
        tree.placeholder().map(|n| n.path.as_str()),
        Some("/projects/2025/New Folder")
    );

    tree.remove_placeholder();
    assert_eq!(tree, original);
}

#[test]
fn test_remove_placeholder_without_one_is_noop() {
    let mut tree = workspace_tree();
    let original = tree.clone();
    assert!(!tree.remove_placeholder());
    assert_eq!(tree, original);
}

#[test]
fn test_create_placeholder_under_missing_parent_fails() {
    let mut tree = workspace_tree();
    let original = tree.clone();
    assert!(tree.create_placeholder("/music").is_err());
    assert_eq!(tree, original);
}

#[test]
fn test_placeholder_can_be_renamed_in_place() {
    let mut tree = small_tree();
    tree.create_placeholder("/a").unwrap().name = "drafts".into();
    assert_eq!(tree.placeholder().unwrap().name, "drafts");
    assert!(tree.remove_placeholder());
    assert_eq!(tree, small_tree());
}

#[test]
fn test_set_roots_discards_placeholder() {
    let mut tree = workspace_tree();
    tree.create_placeholder("/projects").unwrap();
    tree.set_roots(vec![FolderNode::new("/other", "other")]);
    assert!(tree.placeholder().is_none());
    assert!(!tree.remove_placeholder());
}
