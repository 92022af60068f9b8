//! Local session store configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-memory session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Display name of the session root. Overrides whatever name a
    /// restored snapshot carries.
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Reserved name of the hidden magnet marker file. Folders holding a
    /// file with this name are flagged `is_magnet` in listings; the file
    /// itself is never listed.
    #[serde(default = "default_magnet_marker")]
    pub magnet_marker: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            magnet_marker: default_magnet_marker(),
        }
    }
}

fn default_display_name() -> String {
    "Session".to_string()
}

fn default_magnet_marker() -> String {
    ".magnet".to_string()
}
