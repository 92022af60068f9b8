//! Backend profile configuration.

use serde::{Deserialize, Serialize};

/// Configured backend profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Remote network-backed store profiles.
    #[serde(default)]
    pub remotes: Vec<RemoteProfileConfig>,
    /// Read-only registry provider profiles.
    #[serde(default)]
    pub registries: Vec<RegistryProfileConfig>,
}

/// One remote backend profile. A profile exists (is configured) whether
/// or not the backend is currently connected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProfileConfig {
    /// Profile name; doubles as the mount segment in virtual paths.
    pub name: String,
    /// Base URL of the remote store's HTTP API.
    pub base_url: String,
    /// Whether to attempt a connection at startup.
    #[serde(default)]
    pub connect_on_start: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// One read-only registry provider profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryProfileConfig {
    /// Mount name of the provider.
    pub name: String,
    /// Optional JSON file holding the provider's fixed tree. An absent
    /// file yields an empty provider.
    #[serde(default)]
    pub tree_file: Option<String>,
}

fn default_timeout() -> u64 {
    10
}
