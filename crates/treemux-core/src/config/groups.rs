//! Virtual grouping folder names.
//!
//! This table is the extension surface for backend categories: adding a
//! category means one entry here plus one routing rule.

use serde::{Deserialize, Serialize};

/// Display names for the synthetic grouping folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsConfig {
    /// Group folder holding all remote backend roots.
    #[serde(default = "default_remotes_name")]
    pub remotes: String,
    /// Group folder holding all registry provider roots.
    #[serde(default = "default_registries_name")]
    pub registries: String,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            remotes: default_remotes_name(),
            registries: default_registries_name(),
        }
    }
}

fn default_remotes_name() -> String {
    "Remotes".to_string()
}

fn default_registries_name() -> String {
    "Registries".to_string()
}
