//! Remote HTTP backend.
//!
//! Speaks the same JSON protocol `treemux-api` serves, so any treemux
//! node can back a remote profile of another. Transport-level failures
//! map to `NetworkFailure`, distinct from `NotFound`/`Conflict`, so the
//! caller can trigger the disconnect/reconnect flow instead of
//! reporting a plain error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use treemux_core::error::{AppError, ErrorKind};
use treemux_core::result::AppResult;
use treemux_core::traits::backend::Backend;
use treemux_core::types::{TreeNode, VirtualPath};

/// Success envelope every API response is wrapped in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Payload of a file read.
#[derive(Debug, Deserialize)]
struct FileContent {
    content: String,
}

/// Error body returned by the remote API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client backend for one remote store profile.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    /// Profile name.
    name: String,
    /// Base URL of the remote API (no trailing slash).
    base_url: String,
    client: reqwest::Client,
}

impl RemoteBackend {
    /// Create a client for the given profile.
    pub fn new(name: impl Into<String>, base_url: &str, timeout_seconds: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build HTTP client",
                    e,
                )
            })?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The profile name this client serves.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        AppError::with_source(
            ErrorKind::NetworkFailure,
            format!("Backend '{}' transport failure: {err}", self.name),
            err,
        )
    }

    /// Map a non-success status to the error taxonomy, pulling the
    /// remote's message when the body carries one.
    async fn status_error(&self, response: reqwest::Response) -> AppError {
        let status = response.status();
        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("Backend '{}' returned {status}", self.name));

        match status {
            StatusCode::NOT_FOUND => AppError::not_found(message),
            StatusCode::CONFLICT => AppError::conflict(message),
            StatusCode::NOT_IMPLEMENTED => AppError::not_supported(message),
            StatusCode::SERVICE_UNAVAILABLE => AppError::disconnected(message),
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                AppError::network_failure(message)
            }
            StatusCode::BAD_REQUEST => AppError::validation(message),
            _ => AppError::internal(message),
        }
    }

    async fn expect_success(&self, response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.status_error(response).await)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .client
            .get(self.url(route))
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.expect_success(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(envelope.data)
    }

    async fn post_json(&self, route: &str, body: serde_json::Value) -> AppResult<()> {
        let response = self
            .client
            .post(self.url(route))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await?;
        Ok(())
    }

    async fn put_json(&self, route: &str, body: serde_json::Value) -> AppResult<()> {
        let response = self
            .client
            .put(self.url(route))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await?;
        Ok(())
    }

    async fn delete_with(&self, route: &str, query: &[(&str, String)]) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(route))
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn backend_kind(&self) -> &str {
        "remote"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.get(self.url("/api/health")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!(backend = %self.name, error = %e, "Health check failed");
                Ok(false)
            }
        }
    }

    async fn list_contents(&self, path: &VirtualPath) -> AppResult<Vec<TreeNode>> {
        self.get_json("/api/list", &[("path", path.to_string())])
            .await
    }

    async fn full_tree(&self) -> AppResult<TreeNode> {
        self.get_json("/api/tree", &[]).await
    }

    async fn file_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let entries = self.list_contents(path).await?;
        Ok(entries.iter().any(|c| c.is_file() && c.name == name))
    }

    async fn folder_exists(&self, path: &VirtualPath, name: &str) -> AppResult<bool> {
        let entries = self.list_contents(path).await?;
        Ok(entries.iter().any(|c| c.is_container() && c.name == name))
    }

    async fn read_file(&self, path: &VirtualPath, name: &str) -> AppResult<String> {
        let payload: FileContent = self
            .get_json(
                "/api/file",
                &[("path", path.to_string()), ("name", name.to_string())],
            )
            .await?;
        Ok(payload.content)
    }

    async fn write_file(&self, path: &VirtualPath, name: &str, content: &str) -> AppResult<()> {
        self.put_json(
            "/api/file",
            serde_json::json!({
                "path": path.to_string(),
                "name": name,
                "content": content,
            }),
        )
        .await
    }

    async fn create_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.post_json(
            "/api/folders",
            serde_json::json!({ "path": path.to_string(), "name": name }),
        )
        .await
    }

    async fn remove_folder(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.delete_with(
            "/api/folders",
            &[("path", path.to_string()), ("name", name.to_string())],
        )
        .await
    }

    async fn create_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.post_json(
            "/api/files",
            serde_json::json!({ "path": path.to_string(), "name": name }),
        )
        .await
    }

    async fn delete_file(&self, path: &VirtualPath, name: &str) -> AppResult<()> {
        self.delete_with(
            "/api/files",
            &[("path", path.to_string()), ("name", name.to_string())],
        )
        .await
    }

    async fn rename(&self, path: &VirtualPath, old_name: &str, new_name: &str) -> AppResult<()> {
        self.post_json(
            "/api/rename",
            serde_json::json!({
                "path": path.to_string(),
                "old_name": old_name,
                "new_name": new_name,
            }),
        )
        .await
    }

    async fn move_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        self.post_json(
            "/api/move",
            serde_json::json!({
                "source": source.to_string(),
                "dest": dest.to_string(),
                "names": names,
            }),
        )
        .await
    }

    async fn copy_entries(
        &self,
        source: &VirtualPath,
        dest: &VirtualPath,
        names: &[String],
    ) -> AppResult<()> {
        self.post_json(
            "/api/copy",
            serde_json::json!({
                "source": source.to_string(),
                "dest": dest.to_string(),
                "names": names,
            }),
        )
        .await
    }

    async fn import_subtree(&self, dest: &VirtualPath, subtree: TreeNode) -> AppResult<()> {
        self.post_json(
            "/api/import",
            serde_json::json!({ "dest": dest.to_string(), "subtree": subtree }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_network_failure() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let backend = RemoteBackend::new("srv1", "http://192.0.2.1:9", 1).unwrap();
        let err = backend
            .list_contents(&VirtualPath::root())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkFailure);
    }

    #[tokio::test]
    async fn test_unreachable_host_health_check_is_false() {
        let backend = RemoteBackend::new("srv1", "http://192.0.2.1:9", 1).unwrap();
        assert!(!backend.health_check().await.unwrap());
    }

    #[test]
    fn test_base_url_normalization() {
        let backend = RemoteBackend::new("srv1", "http://host:1234/", 5).unwrap();
        assert_eq!(backend.url("/api/tree"), "http://host:1234/api/tree");
    }
}
