//! The navigation facade the UI layer calls.
//!
//! Wraps the router, builder, and patcher behind absolute-path methods,
//! holds the latest displayable snapshot, and owns the two policies that
//! span backends: cross-backend move/copy rejection (no two-phase commit
//! exists) and disconnect-on-network-failure during listings.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use treemux_backend::MemoryBackend;
use treemux_core::error::{AppError, ErrorKind};
use treemux_core::events::{ChannelSubscriber, EventBus};
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{TreeNode, VirtualPath};

use crate::builder::{TreeBuilder, HOME_NAME};
use crate::groups::GroupTable;
use crate::home::HomeAggregator;
use crate::patcher::LazyLoadPatcher;
use crate::registry::BackendRegistry;
use crate::router::{Mount, PathRouter, Resolution};

/// The UI-facing navigation service.
#[derive(Debug)]
pub struct VfsService {
    registry: Arc<BackendRegistry>,
    router: Arc<PathRouter>,
    builder: TreeBuilder,
    patcher: LazyLoadPatcher,
    /// Latest displayable snapshot. Replaced wholesale on rebuild or
    /// patch; readers keep whatever `Arc` they already hold.
    snapshot: RwLock<Arc<TreeNode>>,
    events: Arc<EventBus>,
}

impl VfsService {
    /// Wire the service over the given store and registry.
    pub fn new(
        memory: Arc<MemoryBackend>,
        registry: Arc<BackendRegistry>,
        groups: GroupTable,
        events: Arc<EventBus>,
    ) -> Self {
        let home = Arc::new(HomeAggregator::new(
            memory.clone(),
            registry.clone(),
            groups.clone(),
        ));
        let router = Arc::new(PathRouter::new(
            memory.clone(),
            home,
            registry.clone(),
            groups.clone(),
        ));
        let builder = TreeBuilder::new(memory, registry.clone(), groups);
        let patcher = LazyLoadPatcher::new(router.clone());

        Self {
            registry,
            router,
            builder,
            patcher,
            snapshot: RwLock::new(Arc::new(TreeNode::virtual_group(HOME_NAME, Vec::new()))),
            events,
        }
    }

    /// The registry this service routes through.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Resolve an absolute path to its backend and relative path.
    pub async fn resolve_backend(&self, path: &VirtualPath) -> AppResult<Resolution> {
        self.router.resolve(path).await
    }

    /// Rebuild the full snapshot from every configured backend and
    /// publish it.
    pub async fn rebuild_snapshot(&self) -> AppResult<Arc<TreeNode>> {
        let root = Arc::new(self.builder.rebuild().await?);
        *self.snapshot.write().await = Arc::clone(&root);
        Ok(root)
    }

    /// The latest published snapshot.
    pub async fn current_snapshot(&self) -> Arc<TreeNode> {
        self.snapshot.read().await.clone()
    }

    /// Load the children of the node at `path` into the snapshot, if
    /// they were not fetched yet. Once fetched, navigation never
    /// re-fetches; use [`VfsService::refresh_children`] to force it.
    pub async fn load_children(&self, path: &VirtualPath) -> AppResult<Arc<TreeNode>> {
        let current = self.current_snapshot().await;
        if let Some(node) = Self::node_at(&current, path) {
            if node.children_loaded {
                return Ok(current);
            }
        }
        self.patch_children(current, path).await
    }

    /// Re-fetch the children of the node at `path` unconditionally.
    pub async fn refresh_children(&self, path: &VirtualPath) -> AppResult<Arc<TreeNode>> {
        let current = self.current_snapshot().await;
        self.patch_children(current, path).await
    }

    async fn patch_children(
        &self,
        current: Arc<TreeNode>,
        path: &VirtualPath,
    ) -> AppResult<Arc<TreeNode>> {
        let patched = Arc::new(self.patcher.load_children(&current, path).await?);
        *self.snapshot.write().await = Arc::clone(&patched);
        Ok(patched)
    }

    fn node_at<'a>(snapshot: &'a TreeNode, path: &VirtualPath) -> Option<&'a TreeNode> {
        let mut current = snapshot;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// List the contents of the folder at an absolute path.
    ///
    /// A `NetworkFailure` here is the signal that the backend dropped:
    /// the profile transitions to disconnected (reconnection is the
    /// caller's decision) and the error is surfaced.
    pub async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        let resolution = self.resolve_backend(path).await?;
        match resolution.backend.list_contents(&resolution.relative).await {
            Ok(entries) => Ok(entries),
            Err(e) if e.kind == ErrorKind::NetworkFailure => {
                if let Mount::Remote(name) = &resolution.mount {
                    error!(backend = %name, error = %e, "Listing failed; disconnecting backend");
                    self.registry.disconnect(name).await;
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Read a file under an absolute folder path.
    pub async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String> {
        let resolution = self.resolve_backend(path).await?;
        resolution.backend.read_file(&resolution.relative, name).await
    }

    /// Write a file under an absolute folder path.
    pub async fn write_file(&self, path: &VirtualPath, name: &str, content: &str) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .write_file(&resolution.relative, name, content)
            .await
    }

    /// Whether a file exists under an absolute folder path.
    pub async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let resolution = self.resolve_backend(path).await?;
        resolution.backend.file_exists(&resolution.relative, name).await
    }

    /// Whether a folder exists under an absolute folder path.
    pub async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .folder_exists(&resolution.relative, name)
            .await
    }

    /// Create a folder at an absolute path.
    pub async fn create_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .create_folder(&resolution.relative, name)
            .await?;
        info!(path = %path, name, "Folder created");
        Ok(())
    }

    /// Remove a folder at an absolute path.
    pub async fn remove_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .remove_folder(&resolution.relative, name)
            .await?;
        info!(path = %path, name, "Folder removed");
        Ok(())
    }

    /// Create an empty file at an absolute path.
    pub async fn create_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .create_file(&resolution.relative, name)
            .await?;
        info!(path = %path, name, "File created");
        Ok(())
    }

    /// Delete a file at an absolute path.
    pub async fn delete_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .delete_file(&resolution.relative, name)
            .await?;
        info!(path = %path, name, "File deleted");
        Ok(())
    }

    /// Rename an entry within one absolute folder path.
    pub async fn rename(
        &self,
        path: &VirtualPath,
        old_name: &str,
        new_name: &str,
    ) -> AppResult<()> {
        let resolution = self.resolve_backend(path).await?;
        resolution
            .backend
            .rename(&resolution.relative, old_name, new_name)
            .await?;
        info!(path = %path, old_name, new_name, "Entry renamed");
        Ok(())
    }

    /// Move entries between two absolute folder paths. Both must resolve
    /// to the same backend; no two-phase commit exists across backends.
    pub async fn move_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        let (from, to) = self.same_backend(source, dest, "move").await?;
        from.backend
            .move_entries(&from.relative, &to.relative, names)
            .await?;
        info!(source = %source, dest = %dest, count = names.len(), "Entries moved");
        Ok(())
    }

    /// Copy entries between two absolute folder paths on one backend.
    pub async fn copy_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        let (from, to) = self.same_backend(source, dest, "copy").await?;
        from.backend
            .copy_entries(&from.relative, &to.relative, names)
            .await?;
        info!(source = %source, dest = %dest, count = names.len(), "Entries copied");
        Ok(())
    }

    /// Merge a foreign subtree into the folder at an absolute path.
    pub async fn import_subtree(&self, dest: &VirtualPath, subtree: TreeNode) -> AppResult<()> {
        let resolution = self.resolve_backend(dest).await?;
        resolution
            .backend
            .import_subtree(&resolution.relative, subtree)
            .await?;
        info!(dest = %dest, "Subtree imported");
        Ok(())
    }

    async fn same_backend(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        operation: &str,
    ) -> AppResult<(Resolution, Resolution)> {
        let from = self.resolve_backend(source).await?;
        let to = self.resolve_backend(dest).await?;
        if from.mount != to.mount {
            return Err(AppError::not_supported(format!(
                "Cross-backend {operation} is not supported ({} -> {})",
                source, dest
            )));
        }
        Ok((from, to))
    }

    /// Connect a configured remote backend and refresh the snapshot.
    pub async fn connect(&self, name: &str) -> AppResult<Arc<TreeNode>> {
        self.registry.connect(name).await?;
        self.rebuild_snapshot().await
    }

    /// Disconnect a remote backend and refresh the snapshot.
    pub async fn disconnect(&self, name: &str) -> AppResult<Arc<TreeNode>> {
        self.registry.disconnect(name).await;
        self.rebuild_snapshot().await
    }

    /// Reconnect a remote backend: a serialized disconnect-then-connect
    /// transition, then a snapshot refresh.
    pub async fn reconnect(&self, name: &str) -> AppResult<Arc<TreeNode>> {
        self.registry.disconnect(name).await;
        self.registry.connect(name).await?;
        self.rebuild_snapshot().await
    }
}

/// Subscribe the service to its event bus and spawn the task that
/// rebuilds the snapshot whenever the registry or connection state
/// changes.
pub fn spawn_rebuild_listener(service: Arc<VfsService>) -> JoinHandle<()> {
    let (subscriber, mut rx) = ChannelSubscriber::channel();
    service.events.subscribe(Arc::new(subscriber));
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = service.rebuild_snapshot().await {
                error!(error = %e, event = ?event.payload, "Snapshot rebuild failed");
            }
        }
    })
}
