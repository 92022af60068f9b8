//! Route definitions for the Treemux HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(tree_routes())
        .merge(entry_routes())
        .merge(backend_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Snapshot endpoints: full tree, rebuild, lazy loading.
fn tree_routes() -> Router<AppState> {
    Router::new()
        .route("/tree", get(handlers::tree::get_tree))
        .route("/tree/rebuild", post(handlers::tree::rebuild_tree))
        .route("/children", post(handlers::tree::load_children))
}

/// Entry CRUD, rename, move, copy, import.
fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(handlers::entry::list))
        .route("/file", get(handlers::entry::read_file))
        .route("/file", put(handlers::entry::write_file))
        .route("/folders", post(handlers::entry::create_folder))
        .route("/folders", delete(handlers::entry::remove_folder))
        .route("/files", post(handlers::entry::create_file))
        .route("/files", delete(handlers::entry::delete_file))
        .route("/rename", post(handlers::entry::rename))
        .route("/move", post(handlers::entry::move_entries))
        .route("/copy", post(handlers::entry::copy_entries))
        .route("/import", post(handlers::entry::import_subtree))
}

/// Backend profile listing and connection lifecycle.
fn backend_routes() -> Router<AppState> {
    Router::new()
        .route("/backends", get(handlers::backend::list_backends))
        .route(
            "/backends/{name}/connect",
            post(handlers::backend::connect),
        )
        .route(
            "/backends/{name}/disconnect",
            post(handlers::backend::disconnect),
        )
        .route(
            "/backends/{name}/reconnect",
            post(handlers::backend::reconnect),
        )
}
