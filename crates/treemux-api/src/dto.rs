//! Request DTOs and query types for the navigation API.
//!
//! Paths travel as `/`-separated strings and are parsed into
//! [`VirtualPath`] values at the handler boundary.

use serde::{Deserialize, Serialize};

use treemux_core::types::{TreeNode, VirtualPath};

/// Query string carrying one absolute path.
#[derive(Debug, Clone, Deserialize)]
pub struct PathQuery {
    /// Absolute virtual path; missing or empty means the root.
    #[serde(default)]
    pub path: String,
}

impl PathQuery {
    /// Parse the query into a path value.
    pub fn parse(&self) -> VirtualPath {
        VirtualPath::parse(&self.path)
    }
}

/// Query string addressing one named entry inside a folder.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryQuery {
    /// Absolute path of the containing folder.
    #[serde(default)]
    pub path: String,
    /// Entry name.
    pub name: String,
}

impl EntryQuery {
    /// Parse the folder path.
    pub fn parse(&self) -> VirtualPath {
        VirtualPath::parse(&self.path)
    }
}

/// Body for creating a folder or file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    /// Absolute path of the containing folder.
    #[serde(default)]
    pub path: String,
    /// New entry name.
    pub name: String,
}

/// Body for writing a file payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileRequest {
    /// Absolute path of the containing folder.
    #[serde(default)]
    pub path: String,
    /// File name.
    pub name: String,
    /// Opaque content payload.
    pub content: String,
}

/// Body for renaming an entry in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    /// Absolute path of the containing folder.
    #[serde(default)]
    pub path: String,
    /// Current entry name.
    pub old_name: String,
    /// New entry name.
    pub new_name: String,
}

/// Body for moving or copying entries between folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Absolute source folder path.
    #[serde(default)]
    pub source: String,
    /// Absolute destination folder path.
    #[serde(default)]
    pub dest: String,
    /// Names of the entries to transfer.
    pub names: Vec<String>,
}

/// Body for importing a foreign subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Absolute destination folder path.
    #[serde(default)]
    pub dest: String,
    /// The subtree to merge in.
    pub subtree: TreeNode,
}
