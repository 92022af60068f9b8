//! The backend capability interface.
//!
//! Every storage backend — in-memory, remote, read-only registry, or the
//! disconnected stub — implements the same operation set. All operations
//! are asynchronous and take backend-relative paths, never absolute
//! virtual paths; the path router strips the mount prefix before
//! delegating. The [`Backend`] trait is defined here in `treemux-core`
//! and implemented in `treemux-backend`.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{TreeNode, VirtualPath};

/// Trait for virtual-tree storage backends.
///
/// Contract: an operation against a disconnected or unsupported backend
/// fails with `Disconnected`/`NotSupported` rather than an unrelated
/// error, and `list_contents` on a non-folder or absent path fails with
/// `NotFound`.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend kind name (e.g., "memory", "remote").
    fn backend_kind(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// List the children of the folder at `path`.
    ///
    /// Hidden marker files are never returned; their presence is
    /// reflected as `is_magnet` on the listed folder nodes.
    async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>>;

    /// Return the backend's complete tree.
    async fn full_tree(&self) -> AppResult<TreeNode>;

    /// Whether a file named `name` exists in the folder at `path`.
    async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool>;

    /// Whether a folder named `name` exists in the folder at `path`.
    async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool>;

    /// Read the content payload of a file.
    async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String>;

    /// Write the content payload of a file, creating it if absent.
    async fn write_file(&self, path: &VirtualPath, name: &str, content: &str) -> AppResult<()>;

    /// Create an empty folder named `name` under `path`.
    async fn create_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()>;

    /// Remove the folder named `name` under `path`, with all contents.
    async fn remove_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()>;

    /// Create an empty file named `name` under `path`.
    async fn create_file(&self, path: &VirtualPath, name: &str) -> AppResult<()>;

    /// Delete the file named `name` under `path`.
    async fn delete_file(&self, path: &VirtualPath, name: &str) -> AppResult<()>;

    /// Rename an entry within one folder. Fails with `Conflict` if the
    /// new name collides with an existing sibling, unless renaming to the
    /// entry's own current name.
    async fn rename(&self, path: &VirtualPath, old_name: &str, new_name: &str) -> AppResult<()>;

    /// Move the named entries from `source` to `dest`. All-or-nothing:
    /// fails with `Conflict` if any moved name already exists at the
    /// destination, leaving both folders untouched.
    async fn move_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()>;

    /// Copy the named entries from `source` to `dest`. Never fails on
    /// name collision; colliding copies receive a generated unique name.
    async fn copy_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()>;

    /// Merge a foreign subtree into the folder at `dest`: folders with
    /// matching names merge recursively, files and unmatched folders are
    /// cloned in with fresh modification timestamps.
    async fn import_subtree(&self, dest: &VirtualPath, subtree: TreeNode) -> AppResult<()>;
}
