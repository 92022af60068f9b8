//! Snapshot store implementations.
//!
//! The in-memory store persists its root tree under a fixed key after
//! every mutation. `FileSnapshotStore` keeps one JSON document per key
//! under a data directory; `MemorySnapshotStore` backs tests and
//! ephemeral sessions.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use treemux_core::error::{AppError, ErrorKind};
use treemux_core::result::AppResult;
use treemux_core::traits::snapshot::SnapshotStore;
use treemux_core::types::TreeNode;

/// File-backed snapshot store: one pretty-printed JSON document per key.
#[derive(Debug)]
pub struct FileSnapshotStore {
    /// Directory all snapshot documents live under.
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at the given directory, creating it if
    /// missing.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create snapshot root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a key to its document path. Keys may contain `/`, which
    /// must not escape the root directory.
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key.replace('/', "_")))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, key: &str) -> AppResult<Option<TreeNode>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read snapshot: {}", path.display()),
                    e,
                ));
            }
        };
        let root = serde_json::from_slice(&bytes)?;
        Ok(Some(root))
    }

    async fn save(&self, key: &str, root: &TreeNode) -> AppResult<()> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec_pretty(root)?;
        fs::write(&path, &bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write snapshot: {}", path.display()),
                e,
            )
        })?;
        debug!(key, bytes = bytes.len(), "Persisted snapshot");
        Ok(())
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove snapshot: {}", path.display()),
                e,
            )),
        }
    }
}

/// In-memory snapshot store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, TreeNode>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> AppResult<Option<TreeNode>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, root: &TreeNode) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), root.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
