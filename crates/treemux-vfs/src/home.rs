//! The home aggregator.
//!
//! A synthetic backend answering queries about the virtual root and the
//! grouping folders. Listings are composed from the in-memory store, the
//! configured remote profiles (connected or not), and the registry
//! providers. The hierarchy itself is assembled, not stored, so every
//! mutation fails with `NotSupported`.

use std::sync::Arc;

use async_trait::async_trait;

use treemux_backend::memory::SESSION_BACKEND_ID;
use treemux_backend::MemoryBackend;
use treemux_core::error::AppError;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{TreeNode, VirtualPath};

use crate::builder::HOME_NAME;
use crate::groups::{GroupKind, GroupTable};
use crate::registry::BackendRegistry;

/// Synthetic backend for the root and virtual grouping folders.
#[derive(Debug)]
pub struct HomeAggregator {
    session_name: String,
    memory: Arc<MemoryBackend>,
    registry: Arc<BackendRegistry>,
    groups: GroupTable,
}

impl HomeAggregator {
    /// Create the aggregator.
    pub fn new(
        memory: Arc<MemoryBackend>,
        registry: Arc<BackendRegistry>,
        groups: GroupTable,
    ) -> Self {
        Self {
            session_name: memory.display_name().to_string(),
            memory,
            registry,
            groups,
        }
    }

    /// Backend-root stub for the session store.
    fn session_stub(&self) -> TreeNode {
        TreeNode::backend_root(&self.session_name, SESSION_BACKEND_ID, true)
    }

    /// Member stubs of a group, one backend-root node per profile.
    async fn group_members(&self, kind: GroupKind) -> Vec<TreeNode> {
        match kind {
            GroupKind::Remotes => {
                let mut members = Vec::new();
                for profile in self.registry.remote_profiles().await {
                    let connected = self.registry.is_connected(&profile.name);
                    members.push(TreeNode::backend_root(
                        &profile.name,
                        &profile.name,
                        connected,
                    ));
                }
                members
            }
            GroupKind::Registries => {
                let mut members = Vec::new();
                for name in self.registry.provider_names().await {
                    members.push(TreeNode::backend_root(&name, &name, true));
                }
                members
            }
        }
    }

    /// Resolve a group-prefixed path to the provider responsible for it,
    /// for the group kinds whose members the aggregator serves itself.
    async fn registry_delegate(
        &self,
        path: &VirtualPath,
    ) -> AppResult<Option<(Arc<dyn Backend>, VirtualPath)>> {
        let Some(first) = path.first() else {
            return Ok(None);
        };
        if self.groups.lookup(first) != Some(GroupKind::Registries) || path.len() < 2 {
            return Ok(None);
        }
        let member = path.segments()[1].clone();
        let provider = self
            .registry
            .provider(&member)
            .await
            .ok_or_else(|| AppError::not_found(format!("Unknown registry: {member}")))?;
        Ok(Some((provider, path.strip_prefix(2))))
    }

    fn rejected(operation: &str) -> AppError {
        AppError::not_supported(format!(
            "The home hierarchy is assembled, not stored ({operation})"
        ))
    }
}

#[async_trait]
impl Backend for HomeAggregator {
    fn backend_kind(&self) -> &str {
        "home"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        // Root: session store first, then the groups with membership
        // embedded (membership is fully known here).
        if path.is_root() {
            let mut entries = vec![self.session_stub()];
            for kind in GroupKind::ALL {
                entries.push(TreeNode::virtual_group(
                    self.groups.name_of(kind),
                    self.group_members(kind).await,
                ));
            }
            return Ok(entries);
        }

        // Deeper registry paths are served here; the router sends them
        // back to the aggregator by design.
        if let Some((provider, relative)) = self.registry_delegate(path).await? {
            return provider.list_contents(&relative).await;
        }

        if path.len() == 1 {
            if let Some(kind) = self.groups.lookup(path.segments()[0].as_str()) {
                return Ok(self.group_members(kind).await);
            }
        }

        Err(AppError::not_found(format!(
            "Not part of the home hierarchy: {path}"
        )))
    }

    async fn full_tree(&self) -> AppResult<TreeNode> {
        // Local composition only: the session subtree plus group stubs.
        // The tree builder owns the full fan-out across remote backends.
        let mut root = TreeNode::virtual_group(HOME_NAME, Vec::new());
        root.push_child(self.memory.full_tree().await?);
        for kind in GroupKind::ALL {
            root.push_child(TreeNode::virtual_group(
                self.groups.name_of(kind),
                self.group_members(kind).await,
            ));
        }
        Ok(root)
    }

    async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        match self.list_contents(path).await {
            Ok(entries) => Ok(entries.iter().any(|c| c.is_file() && c.name == name)),
            Err(_) => Ok(false),
        }
    }

    async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        match self.list_contents(path).await {
            Ok(entries) => Ok(entries.iter().any(|c| c.is_container() && c.name == name)),
            Err(_) => Ok(false),
        }
    }

    async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String> {
        if let Some((provider, relative)) = self.registry_delegate(path).await? {
            return provider.read_file(&relative, name).await;
        }
        Err(Self::rejected("read_file"))
    }

    async fn write_file(&self, _path: &VirtualPath, _name: &str, _content: &str) -> AppResult<()> {
        Err(Self::rejected("write_file"))
    }

    async fn create_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::rejected("create_folder"))
    }

    async fn remove_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::rejected("remove_folder"))
    }

    async fn create_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::rejected("create_file"))
    }

    async fn delete_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::rejected("delete_file"))
    }

    async fn rename(&self, _path: &VirtualPath, _old: &str, _new: &str) -> AppResult<()> {
        Err(Self::rejected("rename"))
    }

    async fn move_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(Self::rejected("move"))
    }

    async fn copy_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(Self::rejected("copy"))
    }

    async fn import_subtree(&self, _dest: &VirtualPath, _subtree: TreeNode) -> AppResult<()> {
        Err(Self::rejected("import"))
    }
}
