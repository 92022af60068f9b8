//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod backends;
pub mod groups;
pub mod logging;
pub mod session;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::backends::BackendsConfig;
use self::groups::GroupsConfig;
use self::logging::LoggingConfig;
use self::session::SessionConfig;
use self::snapshot::SnapshotConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Local session store settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Snapshot persistence settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Configured backend profiles.
    #[serde(default)]
    pub backends: BackendsConfig,
    /// Virtual grouping folder names.
    #[serde(default)]
    pub groups: GroupsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific
    /// overlay and environment variables prefixed with `TREEMUX__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TREEMUX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
