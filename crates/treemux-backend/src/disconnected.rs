//! Stub backend for configured-but-unconnected profiles.
//!
//! The path router resolves a known backend name to this stub whenever
//! the profile is not connected. Listings answer empty (never an error),
//! existence probes answer false, and every mutation or read fails with
//! `Disconnected`. This is distinct from "unknown path".

use async_trait::async_trait;

use treemux_core::error::AppError;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{TreeNode, VirtualPath};

/// Placeholder backend answering for a disconnected profile.
#[derive(Debug, Clone)]
pub struct DisconnectedBackend {
    /// Profile name, used in error messages and the stub root.
    name: String,
}

impl DisconnectedBackend {
    /// Create a stub for the named profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn rejected(&self, operation: &str) -> AppError {
        AppError::disconnected(format!(
            "Backend '{}' is not connected ({operation})",
            self.name
        ))
    }
}

#[async_trait]
impl Backend for DisconnectedBackend {
    fn backend_kind(&self) -> &str {
        "disconnected"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn list_contents(&self, _path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        Ok(Vec::new())
    }

    async fn full_tree(&self) -> AppResult<TreeNode> {
        Ok(TreeNode::backend_root(&self.name, &self.name, false))
    }

    async fn file_exists(&self, _path: &VirtualPath, _name: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn folder_exists(&self, _path: &VirtualPath, _name: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn read_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<String> {
        Err(self.rejected("read_file"))
    }

    async fn write_file(&self, _path: &VirtualPath, _name: &str, _content: &str) -> AppResult<()> {
        Err(self.rejected("write_file"))
    }

    async fn create_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(self.rejected("create_folder"))
    }

    async fn remove_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(self.rejected("remove_folder"))
    }

    async fn create_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(self.rejected("create_file"))
    }

    async fn delete_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(self.rejected("delete_file"))
    }

    async fn rename(&self, _path: &VirtualPath, _old: &str, _new: &str) -> AppResult<()> {
        Err(self.rejected("rename"))
    }

    async fn move_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(self.rejected("move"))
    }

    async fn copy_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(self.rejected("copy"))
    }

    async fn import_subtree(&self, _dest: &VirtualPath, _subtree: TreeNode) -> AppResult<()> {
        Err(self.rejected("import"))
    }
}
