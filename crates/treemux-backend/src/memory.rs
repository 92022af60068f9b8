//! The in-memory session store engine.
//!
//! All mutations follow one pattern: clone the published root, locate the
//! relevant nodes by walking the clone, apply the change, swap the clone
//! in as the new root, and persist it. A failure partway through an
//! operation therefore never leaves the live root half-mutated, and
//! readers holding the old root keep a consistent snapshot. Writers are
//! last-writer-wins: each mutation starts from whatever root is published
//! at call time.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use treemux_core::error::AppError;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::traits::snapshot::SnapshotStore;
use treemux_core::types::{NodeKind, TreeNode, VirtualPath};

/// Backend identifier carried by the session root node.
pub const SESSION_BACKEND_ID: &str = "session";

/// In-memory store backing the local session subtree.
#[derive(Debug)]
pub struct MemoryBackend {
    /// Display name of the session root.
    display_name: String,
    /// Reserved name of the hidden magnet marker file.
    marker: String,
    /// Fixed key the root is persisted under.
    key: String,
    /// Durable storage written after every mutation.
    store: Arc<dyn SnapshotStore>,
    /// The published root. Swapped wholesale on every mutation.
    root: RwLock<Arc<TreeNode>>,
}

impl MemoryBackend {
    /// Open the store, restoring the persisted root if one exists.
    ///
    /// The restored root's display name is always overwritten with the
    /// configured session name; names are not required to round-trip.
    pub async fn open(
        display_name: impl Into<String>,
        marker: impl Into<String>,
        store: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
    ) -> AppResult<Self> {
        let display_name = display_name.into();
        let key = key.into();

        let root = match store.load(&key).await? {
            Some(mut restored) => {
                restored.name = display_name.clone();
                restored.kind = NodeKind::BackendRoot;
                restored.backend_id = Some(SESSION_BACKEND_ID.to_string());
                restored.connected = Some(true);
                if restored.children.is_none() {
                    restored.children = Some(Vec::new());
                }
                restored.children_loaded = true;
                debug!(key, "Restored session root from snapshot");
                restored
            }
            None => Self::fresh_root(&display_name),
        };

        Ok(Self {
            display_name,
            marker: marker.into(),
            key,
            store,
            root: RwLock::new(Arc::new(root)),
        })
    }

    fn fresh_root(display_name: &str) -> TreeNode {
        let mut root = TreeNode::backend_root(display_name, SESSION_BACKEND_ID, true);
        root.children = Some(Vec::new());
        root.children_loaded = true;
        root
    }

    /// The session root's display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The currently published root (raw: marker files and file content
    /// included). Listings and `full_tree` return sanitized views.
    pub async fn current_root(&self) -> Arc<TreeNode> {
        self.root.read().await.clone()
    }

    /// Clone-then-replace mutation primitive: apply `apply` to a deep
    /// clone of the published root, swap it in, persist.
    async fn mutate<F>(&self, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut TreeNode) -> AppResult<()>,
    {
        let current = self.root.read().await.clone();
        let mut next = (*current).clone();
        apply(&mut next)?;
        let next = Arc::new(next);
        *self.root.write().await = Arc::clone(&next);
        self.store.save(&self.key, &next).await?;
        Ok(())
    }

    /// Walk `path` in `root`, folder by folder.
    fn folder_at<'a>(root: &'a TreeNode, path: &VirtualPath) -> AppResult<&'a TreeNode> {
        let mut current = root;
        for segment in path.segments() {
            current = current
                .children_or_empty()
                .iter()
                .find(|c| c.is_container() && c.name == *segment)
                .ok_or_else(|| AppError::not_found(format!("Folder not found: {segment}")))?;
        }
        Ok(current)
    }

    /// Walk `path` in `root`, folder by folder, mutably.
    fn folder_at_mut<'a>(root: &'a mut TreeNode, path: &VirtualPath) -> AppResult<&'a mut TreeNode> {
        let mut current = root;
        for segment in path.segments() {
            current = current
                .children
                .as_mut()
                .and_then(|cs| {
                    cs.iter_mut()
                        .find(|c| c.is_container() && c.name == *segment)
                })
                .ok_or_else(|| AppError::not_found(format!("Folder not found: {segment}")))?;
        }
        Ok(current)
    }

    /// Sanitized view of a node for listings and full-tree export: file
    /// content dropped, magnet markers stripped, `is_magnet` derived.
    fn display_node(node: &TreeNode, marker: &str) -> TreeNode {
        let children = node.children.as_ref().map(|cs| {
            cs.iter()
                .filter(|c| !(c.is_file() && c.name == marker))
                .map(|c| Self::display_node(c, marker))
                .collect::<Vec<_>>()
        });
        let is_magnet = node.is_container()
            && node
                .children_or_empty()
                .iter()
                .any(|c| c.is_file() && c.name == marker);

        TreeNode {
            name: node.name.clone(),
            kind: node.kind,
            children,
            children_loaded: node.children_loaded,
            content: None,
            modified: node.modified,
            backend_id: node.backend_id.clone(),
            connected: node.connected,
            is_magnet,
            is_virtual_group: node.is_virtual_group,
        }
    }

    /// Generate a copy name unique among `parent`'s children: the suffix
    /// `" - Copy"`, then `" - Copy (2)"`, `" - Copy (3)"`, … inserted
    /// before the file extension.
    fn unique_copy_name(original: &str, is_file: bool, parent: &TreeNode) -> String {
        let (stem, ext) = if is_file {
            match original.rfind('.') {
                Some(i) if i > 0 => original.split_at(i),
                _ => (original, ""),
            }
        } else {
            (original, "")
        };

        let mut candidate = format!("{stem} - Copy{ext}");
        let mut counter = 2;
        while parent.has_child(&candidate) {
            candidate = format!("{stem} - Copy ({counter}){ext}");
            counter += 1;
        }
        candidate
    }

    /// Merge foreign items into `dest`: folders with matching names merge
    /// recursively, files and unmatched folders are cloned in wholesale
    /// with fresh modification timestamps.
    fn merge_children(dest: &mut TreeNode, incoming: Vec<TreeNode>) {
        for mut item in incoming {
            let folder_merge = item.kind == NodeKind::Folder
                && dest
                    .child(&item.name)
                    .is_some_and(|existing| existing.kind == NodeKind::Folder);

            if folder_merge {
                if let Some(existing) = dest.child_mut(&item.name) {
                    let nested = item.children.take().unwrap_or_default();
                    Self::merge_children(existing, nested);
                    existing.touch();
                }
            } else {
                dest.remove_child(&item.name);
                item.touch_recursive();
                dest.push_child(item);
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn backend_kind(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        let root = self.current_root().await;
        let folder = Self::folder_at(&root, path)?;
        Ok(folder
            .children_or_empty()
            .iter()
            .filter(|c| !(c.is_file() && c.name == self.marker))
            .map(|c| Self::display_node(c, &self.marker))
            .collect())
    }

    async fn full_tree(&self) -> AppResult<TreeNode> {
        let root = self.current_root().await;
        Ok(Self::display_node(&root, &self.marker))
    }

    async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let root = self.current_root().await;
        Ok(Self::folder_at(&root, path)
            .map(|f| {
                f.children_or_empty()
                    .iter()
                    .any(|c| c.is_file() && c.name == name)
            })
            .unwrap_or(false))
    }

    async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let root = self.current_root().await;
        Ok(Self::folder_at(&root, path)
            .map(|f| {
                f.children_or_empty()
                    .iter()
                    .any(|c| c.kind == NodeKind::Folder && c.name == name)
            })
            .unwrap_or(false))
    }

    async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String> {
        let root = self.current_root().await;
        let folder = Self::folder_at(&root, path)?;
        let file = folder
            .children_or_empty()
            .iter()
            .find(|c| c.is_file() && c.name == name)
            .ok_or_else(|| AppError::not_found(format!("File not found: {name}")))?;
        Ok(file.content.clone().unwrap_or_default())
    }

    async fn write_file(&self, path: &VirtualPath, name: &str, content: &str) -> AppResult<()> {
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            match folder.child(name).map(|c| c.kind) {
                Some(NodeKind::File) => {
                    if let Some(existing) = folder.child_mut(name) {
                        existing.content = Some(content.to_string());
                        existing.touch();
                    }
                }
                Some(_) => {
                    return Err(AppError::conflict(format!(
                        "A folder named '{name}' already exists"
                    )));
                }
                None => {
                    folder.push_child(TreeNode::file(name, content));
                    folder.touch();
                }
            }
            Ok(())
        })
        .await
    }

    async fn create_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            if folder.has_child(name) {
                return Err(AppError::conflict(format!(
                    "An entry named '{name}' already exists"
                )));
            }
            folder.push_child(TreeNode::folder(name));
            folder.touch();
            Ok(())
        })
        .await
    }

    async fn remove_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            let exists = folder
                .children_or_empty()
                .iter()
                .any(|c| c.kind == NodeKind::Folder && c.name == name);
            if !exists {
                return Err(AppError::not_found(format!("Folder not found: {name}")));
            }
            folder.remove_child(name);
            folder.touch();
            Ok(())
        })
        .await
    }

    async fn create_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            if folder.has_child(name) {
                return Err(AppError::conflict(format!(
                    "An entry named '{name}' already exists"
                )));
            }
            folder.push_child(TreeNode::file(name, ""));
            folder.touch();
            Ok(())
        })
        .await
    }

    async fn delete_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            let exists = folder
                .children_or_empty()
                .iter()
                .any(|c| c.is_file() && c.name == name);
            if !exists {
                return Err(AppError::not_found(format!("File not found: {name}")));
            }
            folder.remove_child(name);
            folder.touch();
            Ok(())
        })
        .await
    }

    async fn rename(&self, path: &VirtualPath, old_name: &str, new_name: &str) -> AppResult<()> {
        if old_name == new_name {
            return Ok(());
        }
        self.mutate(|root| {
            let folder = Self::folder_at_mut(root, path)?;
            if !folder.has_child(old_name) {
                return Err(AppError::not_found(format!("Entry not found: {old_name}")));
            }
            if folder.has_child(new_name) {
                return Err(AppError::conflict(format!(
                    "An entry named '{new_name}' already exists"
                )));
            }
            if let Some(child) = folder.child_mut(old_name) {
                child.name = new_name.to_string();
                child.touch();
            }
            folder.touch();
            Ok(())
        })
        .await
    }

    async fn move_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        self.mutate(|root| {
            // Filter the request down to entries actually present.
            let moving: Vec<String> = {
                let source_folder = Self::folder_at(root, source)?;
                source_folder
                    .children_or_empty()
                    .iter()
                    .filter(|c| names.contains(&c.name))
                    .map(|c| c.name.clone())
                    .collect()
            };

            // All-or-nothing: any collision at the destination aborts the
            // whole move before anything is detached.
            let dest_folder = Self::folder_at(root, dest)?;
            for name in &moving {
                if dest_folder.has_child(name) {
                    return Err(AppError::conflict(format!(
                        "An entry named '{name}' already exists at the destination"
                    )));
                }
            }

            let mut detached = Vec::with_capacity(moving.len());
            {
                let source_folder = Self::folder_at_mut(root, source)?;
                for name in &moving {
                    if let Some(node) = source_folder.remove_child(name) {
                        detached.push(node);
                    }
                }
                source_folder.touch();
            }

            let dest_folder = Self::folder_at_mut(root, dest)?;
            for node in detached {
                dest_folder.push_child(node);
            }
            dest_folder.touch();
            Ok(())
        })
        .await
    }

    async fn copy_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        self.mutate(|root| {
            let picked: Vec<TreeNode> = {
                let source_folder = Self::folder_at(root, source)?;
                source_folder
                    .children_or_empty()
                    .iter()
                    .filter(|c| names.contains(&c.name))
                    .cloned()
                    .collect()
            };

            let dest_folder = Self::folder_at_mut(root, dest)?;
            for mut item in picked {
                if dest_folder.has_child(&item.name) {
                    item.name = Self::unique_copy_name(&item.name, item.is_file(), dest_folder);
                }
                item.touch();
                dest_folder.push_child(item);
            }
            dest_folder.touch();
            Ok(())
        })
        .await
    }

    async fn import_subtree(&self, dest: &VirtualPath, mut subtree: TreeNode) -> AppResult<()> {
        self.mutate(|root| {
            let items = if subtree.is_file() {
                vec![subtree]
            } else {
                subtree.children.take().unwrap_or_default()
            };
            let dest_folder = Self::folder_at_mut(root, dest)?;
            Self::merge_children(dest_folder, items);
            dest_folder.touch();
            Ok(())
        })
        .await
    }
}
