//! Snapshot handlers: full tree, rebuild, lazy children loading.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::PathQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/tree
pub async fn get_tree(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.vfs.current_snapshot().await;
    Json(serde_json::json!({ "success": true, "data": &*snapshot }))
}

/// POST /api/tree/rebuild
pub async fn rebuild_tree(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.vfs.rebuild_snapshot().await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": &*snapshot }),
    ))
}

/// POST /api/children?path=...
///
/// Fetches one level of children lazily and patches the snapshot.
pub async fn load_children(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.vfs.load_children(&query.parse()).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": &*snapshot }),
    ))
}
