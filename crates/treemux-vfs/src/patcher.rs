//! The lazy-load patcher.
//!
//! Given a path whose children were not yet fetched, fetches that one
//! level from the resolved backend and immutably rewrites only the chain
//! of ancestor nodes from root to the target. Sibling subtrees the user
//! has already expanded keep their state; newly attached child folders
//! start unloaded so deeper levels remain lazy.

use std::sync::Arc;

use treemux_core::error::AppError;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{TreeNode, VirtualPath};

use crate::router::PathRouter;

/// Patches fetched children into an existing snapshot.
#[derive(Debug, Clone)]
pub struct LazyLoadPatcher {
    router: Arc<PathRouter>,
}

impl LazyLoadPatcher {
    /// Create a patcher resolving paths through the given router.
    pub fn new(router: Arc<PathRouter>) -> Self {
        Self { router }
    }

    /// Fetch the children of the node at `path` and return a new
    /// snapshot with just that subtree replaced.
    pub async fn load_children(
        &self,
        snapshot: &TreeNode,
        path: &VirtualPath,
    ) -> AppResult<TreeNode> {
        let resolution = self.router.resolve(path).await?;
        let fetched = resolution
            .backend
            .list_contents(&resolution.relative)
            .await?;

        let children = fetched.into_iter().map(Self::normalize_child).collect();
        Self::patch(snapshot, path.segments(), children)
    }

    /// Fetched child folders start unloaded; file payloads stay
    /// backend-side until read explicitly.
    fn normalize_child(mut child: TreeNode) -> TreeNode {
        if child.is_container() {
            child.children = None;
            child.children_loaded = false;
        }
        child.content = None;
        child
    }

    /// Copy-on-path rewrite: clone the nodes along `segments`, replace
    /// the target's children, keep everything else as-is.
    fn patch(node: &TreeNode, segments: &[String], children: Vec<TreeNode>) -> AppResult<TreeNode> {
        let mut out = node.clone();
        if segments.is_empty() {
            out.children = Some(children);
            out.children_loaded = true;
            return Ok(out);
        }

        let name = &segments[0];
        let existing = out
            .child(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Path segment not found: {name}")))?;
        let patched = Self::patch(&existing, &segments[1..], children)?;
        if let Some(slot) = out.child_mut(name) {
            *slot = patched;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupTable;
    use crate::home::HomeAggregator;
    use crate::registry::BackendRegistry;
    use treemux_backend::{MemoryBackend, MemorySnapshotStore};
    use treemux_core::events::EventBus;
    use treemux_core::traits::backend::Backend;

    async fn setup() -> (Arc<MemoryBackend>, LazyLoadPatcher) {
        let memory = Arc::new(
            MemoryBackend::open(
                "Session",
                ".magnet",
                Arc::new(MemorySnapshotStore::new()),
                "k",
            )
            .await
            .unwrap(),
        );
        let registry = Arc::new(BackendRegistry::new(Arc::new(EventBus::new())));
        let groups = GroupTable::default();
        let home = Arc::new(HomeAggregator::new(
            memory.clone(),
            registry.clone(),
            groups.clone(),
        ));
        let router = Arc::new(PathRouter::new(memory.clone(), home, registry, groups));
        (memory, LazyLoadPatcher::new(router))
    }

    fn unloaded_session_snapshot() -> TreeNode {
        let mut root = TreeNode::virtual_group("Home", Vec::new());
        root.push_child(TreeNode::backend_root("Session", "session", true));
        root.push_child(TreeNode::virtual_group("Remotes", Vec::new()));
        root
    }

    #[tokio::test]
    async fn test_patch_only_touches_target_chain() {
        let (memory, patcher) = setup().await;
        memory
            .create_folder(&VirtualPath::root(), "Docs")
            .await
            .unwrap();

        let snapshot = unloaded_session_snapshot();
        let patched = patcher
            .load_children(&snapshot, &VirtualPath::parse("Session"))
            .await
            .unwrap();

        let session = patched.child("Session").unwrap();
        assert!(session.children_loaded);
        assert_eq!(session.children_or_empty()[0].name, "Docs");
        // Fetched folders stay lazy one level down.
        assert!(!session.children_or_empty()[0].children_loaded);

        // Sibling group untouched.
        assert_eq!(patched.child("Remotes").unwrap(), snapshot.child("Remotes").unwrap());
        // The original snapshot is unchanged.
        assert!(!snapshot.child("Session").unwrap().children_loaded);
    }

    #[tokio::test]
    async fn test_load_children_idempotent() {
        let (memory, patcher) = setup().await;
        memory
            .create_folder(&VirtualPath::root(), "Docs")
            .await
            .unwrap();

        let snapshot = unloaded_session_snapshot();
        let once = patcher
            .load_children(&snapshot, &VirtualPath::parse("Session"))
            .await
            .unwrap();
        let twice = patcher
            .load_children(&once, &VirtualPath::parse("Session"))
            .await
            .unwrap();

        let a = once.child("Session").unwrap();
        let b = twice.child("Session").unwrap();
        assert_eq!(
            a.children_or_empty().iter().map(|c| &c.name).collect::<Vec<_>>(),
            b.children_or_empty().iter().map(|c| &c.name).collect::<Vec<_>>()
        );
        assert_eq!(b.children_or_empty().len(), 1);
    }

    #[tokio::test]
    async fn test_patch_unknown_segment_fails() {
        let (_memory, patcher) = setup().await;
        let snapshot = unloaded_session_snapshot();
        let err = patcher
            .load_children(&snapshot, &VirtualPath::parse("Session/ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, treemux_core::error::ErrorKind::NotFound);
    }
}
