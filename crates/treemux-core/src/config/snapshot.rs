//! Snapshot persistence configuration.

use serde::{Deserialize, Serialize};

/// Settings for durable snapshot storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Fixed key the session root is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            key: default_key(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_key() -> String {
    "session-root".to_string()
}
