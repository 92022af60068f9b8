//! Durable snapshot storage for the in-memory store's root tree.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::TreeNode;

/// Key-value storage for serialized tree roots.
///
/// The in-memory store writes its root under a fixed key after every
/// successful mutation and reads it back once at startup.
#[async_trait]
pub trait SnapshotStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the tree stored under `key`, or `None` if absent.
    async fn load(&self, key: &str) -> AppResult<Option<TreeNode>>;

    /// Persist `root` under `key`, replacing any previous value.
    async fn save(&self, key: &str, root: &TreeNode) -> AppResult<()>;

    /// Remove the value stored under `key`, if any.
    async fn clear(&self, key: &str) -> AppResult<()>;
}
