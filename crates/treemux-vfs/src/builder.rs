//! The tree builder.
//!
//! Assembles one complete, displayable snapshot by walking all
//! configured backends and grafting virtual grouping nodes around the
//! real subtrees. Re-invoked whenever the backend registry or the
//! connected set changes. Per-backend fetch failures degrade to
//! placeholder nodes; one unreachable backend never aborts the rebuild
//! of the others.

use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use treemux_backend::MemoryBackend;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{NodeKind, TreeNode, VirtualPath};

use crate::groups::{GroupKind, GroupTable};
use crate::registry::{BackendRegistry, RemoteProfile};

/// Display name of the synthetic root node.
pub const HOME_NAME: &str = "Home";

/// Builds full tree snapshots.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    memory: Arc<MemoryBackend>,
    registry: Arc<BackendRegistry>,
    groups: GroupTable,
}

impl TreeBuilder {
    /// Create a builder over the given components.
    pub fn new(
        memory: Arc<MemoryBackend>,
        registry: Arc<BackendRegistry>,
        groups: GroupTable,
    ) -> Self {
        Self {
            memory,
            registry,
            groups,
        }
    }

    /// Assemble one root node representing "Home".
    pub async fn rebuild(&self) -> AppResult<TreeNode> {
        let session = self.memory.full_tree().await?;

        // Remote fetches are independent; fan out and join.
        let profiles = self.registry.remote_profiles().await;
        let mut fetches = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let registry = Arc::clone(&self.registry);
            fetches.push(async move { Self::graft_remote(registry, profile).await });
        }
        let remote_nodes = join_all(fetches).await;

        let mut provider_nodes = Vec::new();
        for name in self.registry.provider_names().await {
            provider_nodes.push(self.graft_provider(&name).await);
        }

        let mut root = TreeNode::virtual_group(HOME_NAME, Vec::new());
        root.push_child(session);
        root.push_child(TreeNode::virtual_group(
            self.groups.name_of(GroupKind::Remotes),
            remote_nodes,
        ));
        root.push_child(TreeNode::virtual_group(
            self.groups.name_of(GroupKind::Registries),
            provider_nodes,
        ));
        Ok(root)
    }

    /// Graft one remote backend. Disconnected profiles become
    /// `connected=false` stubs with no children; a connected backend
    /// whose fetch fails becomes a connected-but-empty placeholder so
    /// the UI can tell "present but unreachable" from "not configured".
    async fn graft_remote(registry: Arc<BackendRegistry>, profile: RemoteProfile) -> TreeNode {
        let name = profile.name;
        if !registry.is_connected(&name) {
            return TreeNode::backend_root(&name, &name, false);
        }

        let Some(backend) = registry.live(&name).await else {
            return TreeNode::backend_root(&name, &name, false);
        };

        match backend.full_tree().await {
            Ok(mut tree) => {
                tree.name = name.clone();
                tree.kind = NodeKind::BackendRoot;
                tree.backend_id = Some(name);
                tree.connected = Some(true);
                tree
            }
            Err(e) => {
                warn!(backend = %name, error = %e, "Full-tree fetch failed; grafting placeholder");
                let mut placeholder = TreeNode::backend_root(&name, &name, true);
                placeholder.children = Some(Vec::new());
                placeholder.children_loaded = true;
                placeholder
            }
        }
    }

    /// Graft one registry provider as an ordinary subtree from its
    /// immediate root listing.
    async fn graft_provider(&self, name: &str) -> TreeNode {
        let mut node = TreeNode::backend_root(name, name, true);
        let Some(provider) = self.registry.provider(name).await else {
            return node;
        };
        match provider.list_contents(&VirtualPath::root()).await {
            Ok(children) => {
                node.children = Some(children);
                node.children_loaded = true;
            }
            Err(e) => {
                warn!(registry = %name, error = %e, "Registry listing failed; grafting placeholder");
                node.children = Some(Vec::new());
                node.children_loaded = true;
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RemoteProfile;
    use treemux_backend::{MemorySnapshotStore, RegistryBackend};
    use treemux_core::events::EventBus;
    use treemux_core::traits::backend::Backend;

    async fn memory(name: &str) -> Arc<MemoryBackend> {
        Arc::new(
            MemoryBackend::open(name, ".magnet", Arc::new(MemorySnapshotStore::new()), "k")
                .await
                .unwrap(),
        )
    }

    fn profile(name: &str) -> RemoteProfile {
        RemoteProfile {
            name: name.to_string(),
            base_url: "http://127.0.0.1:0".to_string(),
            timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_rebuild_shape() {
        let registry = Arc::new(BackendRegistry::new(Arc::new(EventBus::new())));
        registry.register_remote(profile("srv1")).await;
        registry
            .register_provider("platform", Arc::new(RegistryBackend::empty("platform")))
            .await;

        let builder = TreeBuilder::new(memory("Session").await, registry, GroupTable::default());
        let root = builder.rebuild().await.unwrap();

        assert_eq!(root.name, HOME_NAME);
        assert!(root.is_virtual_group);
        let names: Vec<&str> = root
            .children_or_empty()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Session", "Remotes", "Registries"]);

        let remotes = root.child("Remotes").unwrap();
        assert!(remotes.children_loaded);
        let srv1 = remotes.child("srv1").unwrap();
        assert_eq!(srv1.connected, Some(false));
        assert!(srv1.children.is_none());
    }

    #[tokio::test]
    async fn test_rebuild_grafts_connected_tree() {
        let registry = Arc::new(BackendRegistry::new(Arc::new(EventBus::new())));
        registry.register_remote(profile("srv1")).await;

        let live = memory("srv1").await;
        live.create_folder(&VirtualPath::root(), "shared")
            .await
            .unwrap();
        registry.connect_with("srv1", live).await.unwrap();

        let builder = TreeBuilder::new(memory("Session").await, registry, GroupTable::default());
        let root = builder.rebuild().await.unwrap();

        let srv1 = root.child("Remotes").unwrap().child("srv1").unwrap();
        assert_eq!(srv1.connected, Some(true));
        assert_eq!(srv1.kind, NodeKind::BackendRoot);
        assert!(srv1.has_child("shared"));
    }
}
