//! Treemux Server — virtual filesystem router
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use treemux_backend::{FileSnapshotStore, MemoryBackend, RegistryBackend};
use treemux_core::config::AppConfig;
use treemux_core::error::AppError;
use treemux_core::events::EventBus;
use treemux_vfs::service::spawn_rebuild_listener;
use treemux_vfs::{BackendRegistry, GroupTable, RemoteProfile, VfsService};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TREEMUX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Treemux v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Snapshot store ───────────────────────────────────
    let snapshots = Arc::new(FileSnapshotStore::new(&config.snapshot.data_root).await?);

    // ── Step 2: In-memory session store ──────────────────────────
    let memory = Arc::new(
        MemoryBackend::open(
            &config.session.display_name,
            &config.session.magnet_marker,
            snapshots,
            &config.snapshot.key,
        )
        .await?,
    );
    tracing::info!(name = %config.session.display_name, "Session store ready");

    // ── Step 3: Backend registry ─────────────────────────────────
    let events = Arc::new(EventBus::new());
    let registry = Arc::new(BackendRegistry::new(events.clone()));

    for profile in &config.backends.remotes {
        registry.register_remote(RemoteProfile::from(profile)).await;
    }
    for profile in &config.backends.registries {
        let provider = match &profile.tree_file {
            Some(path) => RegistryBackend::from_json_file(&profile.name, path).await?,
            None => RegistryBackend::empty(&profile.name),
        };
        registry
            .register_provider(&profile.name, Arc::new(provider))
            .await;
    }
    tracing::info!(
        remotes = config.backends.remotes.len(),
        registries = config.backends.registries.len(),
        "Backend registry populated"
    );

    // ── Step 4: Navigation service ───────────────────────────────
    let vfs = Arc::new(VfsService::new(
        memory,
        registry.clone(),
        GroupTable::new(&config.groups),
        events,
    ));

    let listener = spawn_rebuild_listener(vfs.clone());

    // ── Step 5: Startup connections ──────────────────────────────
    for profile in &config.backends.remotes {
        if profile.connect_on_start {
            if let Err(e) = registry.connect(&profile.name).await {
                tracing::warn!(backend = %profile.name, error = %e, "Startup connection failed");
            }
        }
    }

    // ── Step 6: Initial snapshot ─────────────────────────────────
    let snapshot = vfs.rebuild_snapshot().await?;
    tracing::info!(
        top_level = snapshot.children_or_empty().len(),
        "Initial snapshot built"
    );

    // ── Step 7: HTTP server ──────────────────────────────────────
    let state = treemux_api::AppState {
        config: Arc::new(config.clone()),
        vfs: vfs.clone(),
    };
    let app = treemux_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let tcp_listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Treemux server listening on {}", addr);

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    listener.abort();
    tracing::info!("Treemux server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
