//! Backend lifecycle handlers: listing profiles and driving the
//! connect/disconnect/reconnect transitions.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/backends
pub async fn list_backends(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.vfs.registry();

    let mut backends = Vec::new();
    for profile in registry.remote_profiles().await {
        backends.push(serde_json::json!({
            "name": profile.name,
            "kind": "remote",
            "connected": registry.is_connected(&profile.name),
        }));
    }
    for name in registry.provider_names().await {
        backends.push(serde_json::json!({
            "name": name,
            "kind": "registry",
            "connected": true,
        }));
    }

    Json(serde_json::json!({ "success": true, "data": backends }))
}

/// POST /api/backends/{name}/connect
pub async fn connect(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.vfs.connect(&name).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": &*snapshot }),
    ))
}

/// POST /api/backends/{name}/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.vfs.disconnect(&name).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": &*snapshot }),
    ))
}

/// POST /api/backends/{name}/reconnect
pub async fn reconnect(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.vfs.reconnect(&name).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": &*snapshot }),
    ))
}
