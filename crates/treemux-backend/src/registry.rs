//! Read-only registry provider.
//!
//! Registry providers serve structural metadata (profile catalogs,
//! platform descriptors) as an ordinary subtree. The tree is fixed at
//! construction time; every mutation fails with `NotSupported`.

use async_trait::async_trait;
use tokio::fs;

use treemux_core::error::{AppError, ErrorKind};
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{NodeKind, TreeNode, VirtualPath};

/// A read-only structural backend over a fixed tree.
#[derive(Debug, Clone)]
pub struct RegistryBackend {
    /// Mount name of the provider.
    name: String,
    /// The provider's complete tree, rooted at its mount.
    root: TreeNode,
}

impl RegistryBackend {
    /// Create a provider over the given tree. The root is renamed to the
    /// mount name and marked as a connected backend root.
    pub fn new(name: impl Into<String>, mut root: TreeNode) -> Self {
        let name = name.into();
        root.name = name.clone();
        root.kind = NodeKind::BackendRoot;
        root.backend_id = Some(name.clone());
        root.connected = Some(true);
        if root.children.is_none() {
            root.children = Some(Vec::new());
        }
        root.children_loaded = true;
        Self { name, root }
    }

    /// Create an empty provider.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, TreeNode::folder("registry"))
    }

    /// Load a provider tree from a JSON document on disk.
    pub async fn from_json_file(name: impl Into<String>, path: &str) -> AppResult<Self> {
        let bytes = fs::read(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read registry tree: {path}"),
                e,
            )
        })?;
        let root: TreeNode = serde_json::from_slice(&bytes)?;
        Ok(Self::new(name, root))
    }

    fn rejected(&self, operation: &str) -> AppError {
        AppError::not_supported(format!(
            "Registry '{}' is read-only ({operation})",
            self.name
        ))
    }

    fn folder_at<'a>(&'a self, path: &VirtualPath) -> AppResult<&'a TreeNode> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = current
                .children_or_empty()
                .iter()
                .find(|c| c.is_container() && c.name == *segment)
                .ok_or_else(|| AppError::not_found(format!("Folder not found: {segment}")))?;
        }
        Ok(current)
    }
}

#[async_trait]
impl Backend for RegistryBackend {
    fn backend_kind(&self) -> &str {
        "registry"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        let folder = self.folder_at(path)?;
        Ok(folder.children_or_empty().to_vec())
    }

    async fn full_tree(&self) -> AppResult<TreeNode> {
        Ok(self.root.clone())
    }

    async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        Ok(self
            .folder_at(path)
            .map(|f| {
                f.children_or_empty()
                    .iter()
                    .any(|c| c.is_file() && c.name == name)
            })
            .unwrap_or(false))
    }

    async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        Ok(self
            .folder_at(path)
            .map(|f| {
                f.children_or_empty()
                    .iter()
                    .any(|c| c.kind == NodeKind::Folder && c.name == name)
            })
            .unwrap_or(false))
    }

    async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String> {
        let folder = self.folder_at(path)?;
        let file = folder
            .children_or_empty()
            .iter()
            .find(|c| c.is_file() && c.name == name)
            .ok_or_else(|| AppError::not_found(format!("File not found: {name}")))?;
        Ok(file.content.clone().unwrap_or_default())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegistryBackend {
        let mut root = TreeNode::folder("r");
        let mut profiles = TreeNode::folder("profiles");
        profiles.push_child(TreeNode::file("default.json", "{}"));
        root.push_child(profiles);
        RegistryBackend::new("platform", root)
    }

    #[tokio::test]
    async fn test_listing_and_read() {
        let registry = sample();
        let top = registry.list_contents(&VirtualPath::root()).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "profiles");

        let content = registry
            .read_file(&VirtualPath::parse("profiles"), "default.json")
            .await
            .unwrap();
        assert_eq!(content, "{}");
    }

    #[tokio::test]
    async fn test_mutations_not_supported() {
        let registry = sample();
        let err = registry
            .create_folder(&VirtualPath::root(), "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind, treemux_core::error::ErrorKind::NotSupported);
    }

    #[tokio::test]
    async fn test_root_is_backend_root() {
        let registry = sample();
        let tree = registry.full_tree().await.unwrap();
        assert_eq!(tree.kind, NodeKind::BackendRoot);
        assert_eq!(tree.name, "platform");
        assert_eq!(tree.connected, Some(true));
    }
}
