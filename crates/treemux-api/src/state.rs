//! Shared application state threaded through every handler.

use std::sync::Arc;

use treemux_core::config::AppConfig;
use treemux_vfs::VfsService;

/// State available to all handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The navigation facade.
    pub vfs: Arc<VfsService>,
}
