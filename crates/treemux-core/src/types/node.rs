//! The universal tree node representation.
//!
//! Every layer of the router — backends, the path router, the tree
//! builder, the API — exchanges `TreeNode` values. A node is a file, a
//! folder, or a backend root (the mount point of a whole backend).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a tree node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// A file with an opaque content payload.
    File,
    /// A folder holding child nodes.
    Folder,
    /// A folder that is the mount point of a whole backend.
    BackendRoot,
}

/// A node in the virtual tree.
///
/// `children == None` with `children_loaded == false` means "not yet
/// fetched"; `Some(vec![])` with `children_loaded == true` means "fetched,
/// empty". The two must never be conflated; lazy loading depends on the
/// distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Display/identity segment, unique among siblings.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Child nodes, present only for folders that have been fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// Whether `children` reflects a completed fetch.
    #[serde(default)]
    pub children_loaded: bool,
    /// Opaque file payload, materialized on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Set on every mutation of the node or its semantic contents.
    pub modified: DateTime<Utc>,
    /// Identifier of the owning backend (backend-root nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    /// Soft connectivity flag (backend-root nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    /// Whether this folder carries the hidden magnet marker.
    #[serde(default)]
    pub is_magnet: bool,
    /// True for synthetic organizational folders with no backend of
    /// their own.
    #[serde(default)]
    pub is_virtual_group: bool,
}

impl TreeNode {
    /// Create an empty, fetched folder.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            children: Some(Vec::new()),
            children_loaded: true,
            content: None,
            modified: Utc::now(),
            backend_id: None,
            connected: None,
            is_magnet: false,
            is_virtual_group: false,
        }
    }

    /// Create a file with the given payload.
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: None,
            children_loaded: false,
            content: Some(content.into()),
            modified: Utc::now(),
            backend_id: None,
            connected: None,
            is_magnet: false,
            is_virtual_group: false,
        }
    }

    /// Create a backend-root node with no fetched children.
    pub fn backend_root(
        name: impl Into<String>,
        backend_id: impl Into<String>,
        connected: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::BackendRoot,
            children: None,
            children_loaded: false,
            content: None,
            modified: Utc::now(),
            backend_id: Some(backend_id.into()),
            connected: Some(connected),
            is_magnet: false,
            is_virtual_group: false,
        }
    }

    /// Create a synthetic grouping folder. Membership is fully known at
    /// build time, so groups are always reported as loaded.
    pub fn virtual_group(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            children: Some(children),
            children_loaded: true,
            content: None,
            modified: Utc::now(),
            backend_id: None,
            connected: None,
            is_magnet: false,
            is_virtual_group: true,
        }
    }

    /// Whether the node can hold children.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Folder | NodeKind::BackendRoot)
    }

    /// Whether the node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// The node's children, or an empty slice when unfetched.
    pub fn children_or_empty(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Find a child by name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children_or_empty().iter().find(|c| c.name == name)
    }

    /// Find a child by name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut TreeNode> {
        self.children.as_mut()?.iter_mut().find(|c| c.name == name)
    }

    /// Whether any child carries the given name.
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Append a child node. Sibling-name uniqueness is the caller's
    /// responsibility; backends check before inserting.
    pub fn push_child(&mut self, child: TreeNode) {
        self.children.get_or_insert_with(Vec::new).push(child);
        self.children_loaded = true;
    }

    /// Remove and return a child by name.
    pub fn remove_child(&mut self, name: &str) -> Option<TreeNode> {
        let children = self.children.as_mut()?;
        let idx = children.iter().position(|c| c.name == name)?;
        Some(children.remove(idx))
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Refresh the modification timestamp of this node and every
    /// descendant. Used when cloning foreign subtrees in.
    pub fn touch_recursive(&mut self) {
        self.modified = Utc::now();
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.touch_recursive();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_starts_loaded_and_empty() {
        let f = TreeNode::folder("Docs");
        assert_eq!(f.kind, NodeKind::Folder);
        assert!(f.children_loaded);
        assert_eq!(f.children_or_empty().len(), 0);
    }

    #[test]
    fn test_backend_root_starts_unloaded() {
        let r = TreeNode::backend_root("srv1", "srv1", false);
        assert!(r.children.is_none());
        assert!(!r.children_loaded);
        assert_eq!(r.connected, Some(false));
    }

    #[test]
    fn test_child_lookup_and_removal() {
        let mut f = TreeNode::folder("Docs");
        f.push_child(TreeNode::file("a.txt", "hi"));
        f.push_child(TreeNode::folder("sub"));

        assert!(f.has_child("a.txt"));
        assert!(f.child("sub").is_some());
        assert!(f.child("missing").is_none());

        let removed = f.remove_child("a.txt").unwrap();
        assert_eq!(removed.name, "a.txt");
        assert!(!f.has_child("a.txt"));
    }

    #[test]
    fn test_serde_skips_absent_children() {
        let r = TreeNode::backend_root("srv1", "srv1", true);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("children").is_none());
        assert_eq!(json["children_loaded"], false);
    }
}
