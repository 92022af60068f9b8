//! Backend registry — profiles, live instances, and connection state.
//!
//! A remote profile exists (is configured) independently of whether the
//! backend is currently connected. Connection transitions are serialized:
//! a backend fully disconnects before a new connection attempt, so no
//! backend is ever simultaneously "connecting" and "connected" with
//! mutation calls outstanding.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::info;

use treemux_backend::RemoteBackend;
use treemux_core::config::backends::RemoteProfileConfig;
use treemux_core::error::AppError;
use treemux_core::events::{EventBus, VfsEvent};
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;

/// One configured remote backend profile.
#[derive(Debug, Clone)]
pub struct RemoteProfile {
    /// Profile name; doubles as the mount segment.
    pub name: String,
    /// Base URL of the remote API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl From<&RemoteProfileConfig> for RemoteProfile {
    fn from(config: &RemoteProfileConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: config.base_url.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// Central registry of remote profiles, live backend instances, and
/// read-only structural providers.
#[derive(Debug)]
pub struct BackendRegistry {
    /// Configured remote profiles by name.
    profiles: RwLock<HashMap<String, RemoteProfile>>,
    /// Live instances of currently connected remotes.
    live: RwLock<HashMap<String, Arc<dyn Backend>>>,
    /// Soft connectivity flags, kept even while disconnected.
    connected: DashMap<String, bool>,
    /// Read-only structural providers by mount name.
    providers: RwLock<HashMap<String, Arc<dyn Backend>>>,
    /// Bus notified on every registry or connection-state change.
    events: Arc<EventBus>,
}

impl BackendRegistry {
    /// Create an empty registry publishing to the given bus.
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            live: RwLock::new(HashMap::new()),
            connected: DashMap::new(),
            providers: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Register a remote profile. The backend starts disconnected.
    pub async fn register_remote(&self, profile: RemoteProfile) {
        let name = profile.name.clone();
        self.profiles.write().await.insert(name.clone(), profile);
        self.connected.insert(name.clone(), false);
        self.events.publish(VfsEvent::BackendRegistered {
            name,
            kind: "remote".to_string(),
        });
    }

    /// Remove a remote profile, disconnecting it first if needed.
    pub async fn unregister_remote(&self, name: &str) {
        self.disconnect(name).await;
        let removed = self.profiles.write().await.remove(name).is_some();
        self.connected.remove(name);
        if removed {
            self.events.publish(VfsEvent::BackendUnregistered {
                name: name.to_string(),
            });
        }
    }

    /// Register a read-only structural provider.
    pub async fn register_provider(&self, name: impl Into<String>, backend: Arc<dyn Backend>) {
        let name = name.into();
        self.providers.write().await.insert(name.clone(), backend);
        self.events.publish(VfsEvent::BackendRegistered {
            name,
            kind: "registry".to_string(),
        });
    }

    /// All configured remote profiles, sorted by name.
    pub async fn remote_profiles(&self) -> Vec<RemoteProfile> {
        let profiles = self.profiles.read().await;
        let mut list: Vec<RemoteProfile> = profiles.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Whether a remote profile with this name is configured.
    pub async fn has_remote(&self, name: &str) -> bool {
        self.profiles.read().await.contains_key(name)
    }

    /// Whether the named backend is currently connected.
    pub fn is_connected(&self, name: &str) -> bool {
        self.connected.get(name).map(|v| *v).unwrap_or(false)
    }

    /// The live instance of a connected remote backend.
    pub async fn live(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.live.read().await.get(name).cloned()
    }

    /// A structural provider by mount name.
    pub async fn provider(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.providers.read().await.get(name).cloned()
    }

    /// Mount names of all registered providers, sorted.
    pub async fn provider_names(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Connect the named profile by constructing its HTTP client and
    /// probing it.
    pub async fn connect(&self, name: &str) -> AppResult<()> {
        let profile = self
            .profiles
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown backend profile: {name}")))?;

        let backend =
            RemoteBackend::new(&profile.name, &profile.base_url, profile.timeout_seconds)?;
        self.connect_with(name, Arc::new(backend)).await
    }

    /// Connect the named profile using a caller-supplied instance. The
    /// instance is probed via `health_check` before being published.
    pub async fn connect_with(&self, name: &str, backend: Arc<dyn Backend>) -> AppResult<()> {
        if !self.has_remote(name).await {
            return Err(AppError::not_found(format!(
                "Unknown backend profile: {name}"
            )));
        }

        // Serialized transition: fully disconnect before reconnecting.
        if self.is_connected(name) {
            self.disconnect(name).await;
        }

        if !backend.health_check().await? {
            return Err(AppError::network_failure(format!(
                "Backend '{name}' is unreachable"
            )));
        }

        self.live.write().await.insert(name.to_string(), backend);
        self.connected.insert(name.to_string(), true);
        self.events.publish(VfsEvent::ConnectionChanged {
            name: name.to_string(),
            connected: true,
        });
        info!(backend = %name, "Backend connected");
        Ok(())
    }

    /// Disconnect the named backend, dropping its live instance. A
    /// no-op for unknown or already-disconnected profiles.
    pub async fn disconnect(&self, name: &str) {
        if !self.has_remote(name).await {
            return;
        }

        let was_live = self.live.write().await.remove(name).is_some();
        let was_connected = self.connected.insert(name.to_string(), false) == Some(true);
        if was_live || was_connected {
            self.events.publish(VfsEvent::ConnectionChanged {
                name: name.to_string(),
                connected: false,
            });
            info!(backend = %name, "Backend disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treemux_backend::{MemoryBackend, MemorySnapshotStore};

    async fn live_stub() -> Arc<dyn Backend> {
        Arc::new(
            MemoryBackend::open("srv1", ".magnet", Arc::new(MemorySnapshotStore::new()), "k")
                .await
                .unwrap(),
        )
    }

    fn profile(name: &str) -> RemoteProfile {
        RemoteProfile {
            name: name.to_string(),
            base_url: "http://127.0.0.1:0".to_string(),
            timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_register_starts_disconnected() {
        let registry = BackendRegistry::new(Arc::new(EventBus::new()));
        registry.register_remote(profile("srv1")).await;

        assert!(registry.has_remote("srv1").await);
        assert!(!registry.is_connected("srv1"));
        assert!(registry.live("srv1").await.is_none());
    }

    #[tokio::test]
    async fn test_connect_with_publishes_live_instance() {
        let registry = BackendRegistry::new(Arc::new(EventBus::new()));
        registry.register_remote(profile("srv1")).await;
        registry.connect_with("srv1", live_stub().await).await.unwrap();

        assert!(registry.is_connected("srv1"));
        assert!(registry.live("srv1").await.is_some());

        registry.disconnect("srv1").await;
        assert!(!registry.is_connected("srv1"));
        assert!(registry.live("srv1").await.is_none());
        // Still configured.
        assert!(registry.has_remote("srv1").await);
    }

    #[tokio::test]
    async fn test_connect_unknown_profile_fails() {
        let registry = BackendRegistry::new(Arc::new(EventBus::new()));
        let err = registry
            .connect_with("ghost", live_stub().await)
            .await
            .unwrap_err();
        assert_eq!(err.kind, treemux_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_connection_events_published() {
        use treemux_core::events::ChannelSubscriber;

        let bus = Arc::new(EventBus::new());
        let (subscriber, mut rx) = ChannelSubscriber::channel();
        bus.subscribe(Arc::new(subscriber));

        let registry = BackendRegistry::new(bus);
        registry.register_remote(profile("srv1")).await;
        registry.connect_with("srv1", live_stub().await).await.unwrap();
        registry.disconnect("srv1").await;

        let registered = rx.recv().await.unwrap();
        assert!(matches!(
            registered.payload,
            VfsEvent::BackendRegistered { .. }
        ));
        let connected = rx.recv().await.unwrap();
        assert!(matches!(
            connected.payload,
            VfsEvent::ConnectionChanged { connected: true, .. }
        ));
        let disconnected = rx.recv().await.unwrap();
        assert!(matches!(
            disconnected.payload,
            VfsEvent::ConnectionChanged { connected: false, .. }
        ));
    }

    #[tokio::test]
    async fn test_unregister_removes_and_disconnects() {
        let registry = BackendRegistry::new(Arc::new(EventBus::new()));
        registry.register_remote(profile("srv1")).await;
        registry.connect_with("srv1", live_stub().await).await.unwrap();

        registry.unregister_remote("srv1").await;
        assert!(!registry.has_remote("srv1").await);
        assert!(!registry.is_connected("srv1"));
        assert!(registry.live("srv1").await.is_none());
    }
}
