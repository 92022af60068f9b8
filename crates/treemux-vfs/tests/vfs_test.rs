//! End-to-end scenarios through the navigation facade: routing, snapshot
//! assembly, lazy loading, connection lifecycle, and the cross-backend
//! policies.

use std::sync::Arc;

use async_trait::async_trait;

use treemux_backend::{MemoryBackend, MemorySnapshotStore, RegistryBackend};
use treemux_core::error::{AppError, ErrorKind};
use treemux_core::events::EventBus;
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{NodeKind, TreeNode, VirtualPath};
use treemux_vfs::{BackendRegistry, GroupTable, Mount, RemoteProfile, VfsService};

/// A backend whose every operation fails at the transport level. Stands
/// in for a remote that accepted a connection and then dropped.
#[derive(Debug)]
struct FlakyBackend;

impl FlakyBackend {
    fn failure() -> AppError {
        AppError::network_failure("connection reset")
    }
}

#[async_trait]
impl Backend for FlakyBackend {
    fn backend_kind(&self) -> &str {
        "remote"
    }
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
    async fn list_contents(&self, _path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        Err(Self::failure())
    }
    async fn full_tree(&self) -> AppResult<TreeNode> {
        Err(Self::failure())
    }
    async fn file_exists(&self, _path: &VirtualPath, _name: &str) -> AppResult<bool> {
        Err(Self::failure())
    }
    async fn folder_exists(&self, _path: &VirtualPath, _name: &str) -> AppResult<bool> {
        Err(Self::failure())
    }
    async fn read_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<String> {
        Err(Self::failure())
    }
    async fn write_file(&self, _path: &VirtualPath, _name: &str, _content: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn create_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn remove_folder(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn create_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn delete_file(&self, _path: &VirtualPath, _name: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn rename(&self, _path: &VirtualPath, _old: &str, _new: &str) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn move_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn copy_entries(
        &self,
        _source: &VirtualPath,
        _dest: &VirtualPath,
        _names: &[String],
    ) -> AppResult<()> {
        Err(Self::failure())
    }
    async fn import_subtree(&self, _dest: &VirtualPath, _subtree: TreeNode) -> AppResult<()> {
        Err(Self::failure())
    }
}

struct TestVfs {
    service: Arc<VfsService>,
    registry: Arc<BackendRegistry>,
}

async fn setup() -> TestVfs {
    let memory = Arc::new(
        MemoryBackend::open(
            "Session",
            ".magnet",
            Arc::new(MemorySnapshotStore::new()),
            "session-root",
        )
        .await
        .unwrap(),
    );
    let events = Arc::new(EventBus::new());
    let registry = Arc::new(BackendRegistry::new(events.clone()));
    registry
        .register_remote(RemoteProfile {
            name: "srv1".to_string(),
            base_url: "http://127.0.0.1:0".to_string(),
            timeout_seconds: 1,
        })
        .await;

    let mut tree = TreeNode::folder("r");
    tree.push_child(TreeNode::file("catalog.json", "{}"));
    registry
        .register_provider("platform", Arc::new(RegistryBackend::new("platform", tree)))
        .await;

    let service = Arc::new(VfsService::new(
        memory,
        registry.clone(),
        GroupTable::default(),
        events,
    ));
    service.rebuild_snapshot().await.unwrap();
    TestVfs { service, registry }
}

/// A live in-memory stand-in for a connected remote store.
async fn live_remote(name: &str) -> Arc<MemoryBackend> {
    Arc::new(
        MemoryBackend::open(name, ".magnet", Arc::new(MemorySnapshotStore::new()), "k")
            .await
            .unwrap(),
    )
}

fn names(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

#[tokio::test]
async fn test_path_round_trip() {
    let vfs = setup().await;
    for raw in ["Session/a/b", "srv1/x", "platform/profiles"] {
        let path = VirtualPath::parse(raw);
        let resolution = vfs.service.resolve_backend(&path).await.unwrap();
        // Re-prefixing the relative path with the mount segment yields
        // the original absolute path.
        let mut rebuilt = VirtualPath::from_segments([path.first().unwrap()]);
        for segment in resolution.relative.segments() {
            rebuilt = rebuilt.join(segment.clone());
        }
        assert_eq!(rebuilt, path, "round trip failed for {raw}");
    }
}

#[tokio::test]
async fn test_scenario_create_rename_through_absolute_paths() {
    let vfs = setup().await;
    let session = VirtualPath::parse("Session");

    vfs.service.create_folder(&session, "Work").await.unwrap();
    vfs.service
        .create_folder(&VirtualPath::parse("Session/Work"), "Work")
        .await
        .unwrap();
    vfs.service
        .rename(&session, "Work", "Archive")
        .await
        .unwrap();

    let listing = vfs.service.list_contents(&session).await.unwrap();
    assert_eq!(names(&listing), vec!["Archive"]);
    let inner = vfs
        .service
        .list_contents(&VirtualPath::parse("Session/Archive"))
        .await
        .unwrap();
    assert_eq!(names(&inner), vec!["Work"]);
}

#[tokio::test]
async fn test_scenario_copy_into_same_folder() {
    let vfs = setup().await;
    let docs = VirtualPath::parse("Session/Docs");

    vfs.service
        .create_folder(&VirtualPath::parse("Session"), "Docs")
        .await
        .unwrap();
    vfs.service.create_file(&docs, "a.txt").await.unwrap();
    vfs.service
        .copy_entries(&docs, &docs, &["a.txt".to_string()])
        .await
        .unwrap();

    let listing = vfs.service.list_contents(&docs).await.unwrap();
    assert_eq!(names(&listing), vec!["a.txt", "a - Copy.txt"]);
}

#[tokio::test]
async fn test_disconnected_backend_listing_and_mutation() {
    let vfs = setup().await;
    let path = VirtualPath::parse("srv1/anything");

    // Configured but unconnected: listings answer empty, never throw.
    let listing = vfs.service.list_contents(&path).await.unwrap();
    assert!(listing.is_empty());

    let err = vfs
        .service
        .create_folder(&path, "docs")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Disconnected);
}

#[tokio::test]
async fn test_unknown_top_segment_falls_back_to_session() {
    let vfs = setup().await;
    // A path captured before its backend was removed still lands in the
    // local store.
    let resolution = vfs
        .service
        .resolve_backend(&VirtualPath::parse("retired-server/notes"))
        .await
        .unwrap();
    assert_eq!(resolution.mount, Mount::Session);
    assert_eq!(
        resolution.relative,
        VirtualPath::parse("retired-server/notes")
    );
}

#[tokio::test]
async fn test_rebuild_after_connect_grafts_remote_tree() {
    let vfs = setup().await;
    let remote = live_remote("srv1").await;
    remote
        .create_folder(&VirtualPath::root(), "shared")
        .await
        .unwrap();
    vfs.registry.connect_with("srv1", remote).await.unwrap();

    let snapshot = vfs.service.rebuild_snapshot().await.unwrap();
    let srv1 = snapshot.child("Remotes").unwrap().child("srv1").unwrap();
    assert_eq!(srv1.connected, Some(true));
    assert!(srv1.has_child("shared"));

    // Operations now route to the live instance.
    let listing = vfs
        .service
        .list_contents(&VirtualPath::parse("srv1"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["shared"]);
}

#[tokio::test]
async fn test_rebuild_isolates_backend_failure() {
    let vfs = setup().await;
    vfs.registry
        .connect_with("srv1", Arc::new(FlakyBackend))
        .await
        .unwrap();

    // The failing backend degrades to a connected-but-empty placeholder;
    // the rest of the snapshot still assembles.
    let snapshot = vfs.service.rebuild_snapshot().await.unwrap();
    let srv1 = snapshot.child("Remotes").unwrap().child("srv1").unwrap();
    assert_eq!(srv1.connected, Some(true));
    assert!(srv1.children_loaded);
    assert!(srv1.children_or_empty().is_empty());
    assert!(snapshot.child("Session").is_some());
}

#[tokio::test]
async fn test_rebuild_connected_empty_backend_looks_identical() {
    // Pins the preserved semantics: a genuinely empty connected backend
    // is indistinguishable from one whose fetch failed.
    let vfs = setup().await;
    vfs.registry
        .connect_with("srv1", live_remote("srv1").await)
        .await
        .unwrap();

    let snapshot = vfs.service.rebuild_snapshot().await.unwrap();
    let srv1 = snapshot.child("Remotes").unwrap().child("srv1").unwrap();
    assert_eq!(srv1.connected, Some(true));
    assert!(srv1.children_loaded);
    assert!(srv1.children_or_empty().is_empty());
}

#[tokio::test]
async fn test_network_failure_on_listing_disconnects() {
    let vfs = setup().await;
    vfs.registry
        .connect_with("srv1", Arc::new(FlakyBackend))
        .await
        .unwrap();
    assert!(vfs.registry.is_connected("srv1"));

    let err = vfs
        .service
        .list_contents(&VirtualPath::parse("srv1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NetworkFailure);

    // The failed listing triggered the disconnect transition.
    assert!(!vfs.registry.is_connected("srv1"));
    let listing = vfs
        .service
        .list_contents(&VirtualPath::parse("srv1"))
        .await
        .unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_reconnect_is_serialized_transition() {
    let vfs = setup().await;
    vfs.registry
        .connect_with("srv1", live_remote("srv1").await)
        .await
        .unwrap();

    // Reconnect builds a real HTTP client for the configured URL, which
    // is unreachable here; the backend ends up disconnected.
    let err = vfs.service.reconnect("srv1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NetworkFailure);
    assert!(!vfs.registry.is_connected("srv1"));
}

#[tokio::test]
async fn test_cross_backend_move_rejected() {
    let vfs = setup().await;
    vfs.registry
        .connect_with("srv1", live_remote("srv1").await)
        .await
        .unwrap();
    vfs.service
        .create_file(&VirtualPath::parse("Session"), "a.txt")
        .await
        .unwrap();

    let err = vfs
        .service
        .move_entries(
            &VirtualPath::parse("Session"),
            &VirtualPath::parse("srv1"),
            &["a.txt".to_string()],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);

    // Nothing moved.
    let listing = vfs
        .service
        .list_contents(&VirtualPath::parse("Session"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["a.txt"]);
}

#[tokio::test]
async fn test_move_within_one_backend_is_allowed() {
    let vfs = setup().await;
    let session = VirtualPath::parse("Session");
    vfs.service.create_folder(&session, "src").await.unwrap();
    vfs.service.create_folder(&session, "dst").await.unwrap();
    vfs.service
        .create_file(&VirtualPath::parse("Session/src"), "a.txt")
        .await
        .unwrap();

    vfs.service
        .move_entries(
            &VirtualPath::parse("Session/src"),
            &VirtualPath::parse("Session/dst"),
            &["a.txt".to_string()],
        )
        .await
        .unwrap();

    let dst = vfs
        .service
        .list_contents(&VirtualPath::parse("Session/dst"))
        .await
        .unwrap();
    assert_eq!(names(&dst), vec!["a.txt"]);
}

#[tokio::test]
async fn test_magnet_flag_surfaces_through_facade() {
    let vfs = setup().await;
    let session = VirtualPath::parse("Session");
    let pinned = VirtualPath::parse("Session/Pinned");

    vfs.service.create_folder(&session, "Pinned").await.unwrap();
    vfs.service.create_file(&pinned, ".magnet").await.unwrap();

    let listing = vfs.service.list_contents(&session).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert!(listing[0].is_magnet);
    assert!(vfs.service.list_contents(&pinned).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lazy_load_through_facade() {
    let vfs = setup().await;
    vfs.service
        .create_folder(&VirtualPath::parse("Session"), "Docs")
        .await
        .unwrap();
    let snapshot = vfs.service.rebuild_snapshot().await.unwrap();

    // The builder grafts the session tree fully loaded; a registry
    // member inside a group starts unloaded in home listings. Exercise
    // the patcher against the group member path.
    let platform_path = VirtualPath::parse("Registries/platform");
    let before = snapshot
        .child("Registries")
        .unwrap()
        .child("platform")
        .unwrap();
    assert!(before.children_loaded);

    let patched = vfs.service.refresh_children(&platform_path).await.unwrap();
    let platform = patched
        .child("Registries")
        .unwrap()
        .child("platform")
        .unwrap();
    assert!(platform.children_loaded);
    assert_eq!(names(platform.children_or_empty()), vec!["catalog.json"]);

    // Idempotent: a second load returns equivalent children without
    // duplicating entries.
    let again = vfs.service.load_children(&platform_path).await.unwrap();
    let platform_again = again
        .child("Registries")
        .unwrap()
        .child("platform")
        .unwrap();
    assert_eq!(names(platform_again.children_or_empty()), vec!["catalog.json"]);
}

#[tokio::test]
async fn test_registry_mutation_not_supported() {
    let vfs = setup().await;
    let err = vfs
        .service
        .create_folder(&VirtualPath::parse("platform"), "x")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotSupported);
}

#[tokio::test]
async fn test_root_listing_shape() {
    let vfs = setup().await;
    let listing = vfs.service.list_contents(&VirtualPath::root()).await.unwrap();
    assert_eq!(names(&listing), vec!["Session", "Remotes", "Registries"]);
    assert_eq!(listing[0].kind, NodeKind::BackendRoot);
    assert!(listing[1].is_virtual_group);
}
