//! Entry handlers: listing, file payloads, folder/file CRUD, rename,
//! move, copy, and subtree import — all parameterized by absolute
//! virtual paths.

use axum::Json;
use axum::extract::{Query, State};

use treemux_core::types::VirtualPath;

use crate::dto::{
    CreateEntryRequest, EntryQuery, ImportRequest, PathQuery, RenameRequest, TransferRequest,
    WriteFileRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

fn ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

/// GET /api/list?path=...
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state.vfs.list_contents(&query.parse()).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": entries }),
    ))
}

/// GET /api/file?path=...&name=...
pub async fn read_file(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = state.vfs.read_file(&query.parse(), &query.name).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "content": content } }),
    ))
}

/// PUT /api/file
pub async fn write_file(
    State(state): State<AppState>,
    Json(req): Json<WriteFileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .write_file(&VirtualPath::parse(&req.path), &req.name, &req.content)
        .await?;
    Ok(ok())
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .create_folder(&VirtualPath::parse(&req.path), &req.name)
        .await?;
    Ok(ok())
}

/// DELETE /api/folders?path=...&name=...
pub async fn remove_folder(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.vfs.remove_folder(&query.parse(), &query.name).await?;
    Ok(ok())
}

/// POST /api/files
pub async fn create_file(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .create_file(&VirtualPath::parse(&req.path), &req.name)
        .await?;
    Ok(ok())
}

/// DELETE /api/files?path=...&name=...
pub async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.vfs.delete_file(&query.parse(), &query.name).await?;
    Ok(ok())
}

/// POST /api/rename
pub async fn rename(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .rename(&VirtualPath::parse(&req.path), &req.old_name, &req.new_name)
        .await?;
    Ok(ok())
}

/// POST /api/move
pub async fn move_entries(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .move_entries(
            &VirtualPath::parse(&req.source),
            &VirtualPath::parse(&req.dest),
            &req.names,
        )
        .await?;
    Ok(ok())
}

/// POST /api/copy
pub async fn copy_entries(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .copy_entries(
            &VirtualPath::parse(&req.source),
            &VirtualPath::parse(&req.dest),
            &req.names,
        )
        .await?;
    Ok(ok())
}

/// POST /api/import
pub async fn import_subtree(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .vfs
        .import_subtree(&VirtualPath::parse(&req.dest), req.subtree)
        .await?;
    Ok(ok())
}
