//! The path router.
//!
//! Maps an absolute virtual path to the backend responsible for it and
//! the path relative to that backend's own root. Resolution is a pure
//! function of the path, the current registry contents, and the current
//! connection-state map, with no caching, so the tree builder and every
//! mutation handler agree on where a path leads.

use std::sync::Arc;

use treemux_backend::{DisconnectedBackend, MemoryBackend};
use treemux_core::error::AppError;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::VirtualPath;

use crate::groups::{GroupKind, GroupTable};
use crate::home::HomeAggregator;
use crate::registry::BackendRegistry;

/// Identity of the mount a path resolved to. Two resolutions refer to
/// the same backend exactly when their mounts are equal; cross-backend
/// operation checks compare these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mount {
    /// The home aggregator (root and virtual group paths).
    Home,
    /// The in-memory session store.
    Session,
    /// A connected remote backend.
    Remote(String),
    /// A configured but unconnected remote backend.
    Disconnected(String),
    /// A read-only registry provider.
    Provider(String),
}

/// The result of resolving an absolute virtual path.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Which mount the path landed on.
    pub mount: Mount,
    /// The backend instance to issue operations against.
    pub backend: Arc<dyn Backend>,
    /// The path relative to the backend's own root.
    pub relative: VirtualPath,
}

/// Resolves absolute virtual paths to backends.
#[derive(Debug, Clone)]
pub struct PathRouter {
    session_name: String,
    memory: Arc<MemoryBackend>,
    home: Arc<HomeAggregator>,
    registry: Arc<BackendRegistry>,
    groups: GroupTable,
}

impl PathRouter {
    /// Create a router over the given components.
    pub fn new(
        memory: Arc<MemoryBackend>,
        home: Arc<HomeAggregator>,
        registry: Arc<BackendRegistry>,
        groups: GroupTable,
    ) -> Self {
        Self {
            session_name: memory.display_name().to_string(),
            memory,
            home,
            registry,
            groups,
        }
    }

    fn home_resolution(&self, path: &VirtualPath) -> Resolution {
        Resolution {
            mount: Mount::Home,
            backend: self.home.clone(),
            relative: path.clone(),
        }
    }

    /// Resolve a remote profile name to its live instance or, when the
    /// profile is known but unconnected, to the disconnected stub. This
    /// is distinct from an unknown path.
    async fn remote_resolution(&self, name: &str, relative: VirtualPath) -> Resolution {
        if self.registry.is_connected(name) {
            if let Some(live) = self.registry.live(name).await {
                return Resolution {
                    mount: Mount::Remote(name.to_string()),
                    backend: live,
                    relative,
                };
            }
        }
        Resolution {
            mount: Mount::Disconnected(name.to_string()),
            backend: Arc::new(DisconnectedBackend::new(name)),
            relative,
        }
    }

    /// Resolve an absolute virtual path. Rules apply in order; the first
    /// match wins.
    pub async fn resolve(&self, path: &VirtualPath) -> AppResult<Resolution> {
        // 1. Empty path → home aggregator.
        let Some(first) = path.first() else {
            return Ok(self.home_resolution(path));
        };

        // 2. Virtual group folders. Groups either resolve back to the
        // aggregator (membership embedded in the snapshot) or, past the
        // group name, to the member backend named by the next segment.
        if let Some(kind) = self.groups.lookup(first) {
            match kind {
                GroupKind::Remotes if path.len() >= 2 => {
                    let member = path.segments()[1].clone();
                    if !self.registry.has_remote(&member).await {
                        return Err(AppError::not_found(format!("Unknown backend: {member}")));
                    }
                    return Ok(self.remote_resolution(&member, path.strip_prefix(2)).await);
                }
                _ => return Ok(self.home_resolution(path)),
            }
        }

        // 3. The configured session display name → in-memory store.
        if first == self.session_name {
            return Ok(Resolution {
                mount: Mount::Session,
                backend: self.memory.clone(),
                relative: path.strip_prefix(1),
            });
        }

        // 4. A registered structural provider's mount name.
        if let Some(provider) = self.registry.provider(first).await {
            return Ok(Resolution {
                mount: Mount::Provider(first.to_string()),
                backend: provider,
                relative: path.strip_prefix(1),
            });
        }

        // 5. A known remote profile name, connected or not.
        if self.registry.has_remote(first).await {
            let name = first.to_string();
            return Ok(self.remote_resolution(&name, path.strip_prefix(1)).await);
        }

        // 6. Fallback: treat unrecognized top segments as local paths.
        // Preserves paths captured before a backend was renamed/removed.
        Ok(Resolution {
            mount: Mount::Session,
            backend: self.memory.clone(),
            relative: path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RemoteProfile;
    use treemux_backend::{MemorySnapshotStore, RegistryBackend};
    use treemux_core::events::EventBus;

    async fn router() -> PathRouter {
        let memory = Arc::new(
            MemoryBackend::open(
                "Session",
                ".magnet",
                Arc::new(MemorySnapshotStore::new()),
                "k",
            )
            .await
            .unwrap(),
        );
        let registry = Arc::new(BackendRegistry::new(Arc::new(EventBus::new())));
        registry
            .register_remote(RemoteProfile {
                name: "srv1".to_string(),
                base_url: "http://127.0.0.1:0".to_string(),
                timeout_seconds: 1,
            })
            .await;
        registry
            .register_provider("platform", Arc::new(RegistryBackend::empty("platform")))
            .await;

        let groups = GroupTable::default();
        let home = Arc::new(HomeAggregator::new(
            memory.clone(),
            registry.clone(),
            groups.clone(),
        ));
        PathRouter::new(memory, home, registry, groups)
    }

    #[tokio::test]
    async fn test_empty_path_routes_home() {
        let router = router().await;
        let resolution = router.resolve(&VirtualPath::root()).await.unwrap();
        assert_eq!(resolution.mount, Mount::Home);
        assert!(resolution.relative.is_root());
    }

    #[tokio::test]
    async fn test_session_prefix_is_stripped() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("Session/docs/reports"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Session);
        assert_eq!(resolution.relative, VirtualPath::parse("docs/reports"));
    }

    #[tokio::test]
    async fn test_bare_group_routes_home() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("Remotes"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Home);
        assert_eq!(resolution.relative, VirtualPath::parse("Remotes"));
    }

    #[tokio::test]
    async fn test_remote_group_member_routing() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("Remotes/srv1/docs"))
            .await
            .unwrap();
        // srv1 is configured but not connected.
        assert_eq!(resolution.mount, Mount::Disconnected("srv1".to_string()));
        assert_eq!(resolution.relative, VirtualPath::parse("docs"));

        let err = router
            .resolve(&VirtualPath::parse("Remotes/ghost/docs"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, treemux_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_registry_group_resolves_home() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("Registries/platform/profiles"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Home);
        assert_eq!(
            resolution.relative,
            VirtualPath::parse("Registries/platform/profiles")
        );
    }

    #[tokio::test]
    async fn test_provider_mount_passes_remainder() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("platform/profiles"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Provider("platform".to_string()));
        assert_eq!(resolution.relative, VirtualPath::parse("profiles"));
    }

    #[tokio::test]
    async fn test_top_level_remote_name() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("srv1/docs"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Disconnected("srv1".to_string()));
        assert_eq!(resolution.relative, VirtualPath::parse("docs"));
    }

    #[tokio::test]
    async fn test_fallback_keeps_full_path() {
        let router = router().await;
        let resolution = router
            .resolve(&VirtualPath::parse("old-backend/notes"))
            .await
            .unwrap();
        assert_eq!(resolution.mount, Mount::Session);
        assert_eq!(resolution.relative, VirtualPath::parse("old-backend/notes"));
    }
}
