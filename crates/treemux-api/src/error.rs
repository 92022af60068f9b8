//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use treemux_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Response-convertible wrapper around the domain error.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Disconnected => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::NotSupported => StatusCode::NOT_IMPLEMENTED,
            ErrorKind::NetworkFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Serialization => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Storage | ErrorKind::Internal => {
                tracing::error!(error = %err.message, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_kinds_map_to_distinct_statuses() {
        let cases = [
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::Conflict, StatusCode::CONFLICT),
            (ErrorKind::Disconnected, StatusCode::SERVICE_UNAVAILABLE),
            (ErrorKind::NotSupported, StatusCode::NOT_IMPLEMENTED),
            (ErrorKind::NetworkFailure, StatusCode::BAD_GATEWAY),
        ];
        for (kind, status) in cases {
            let response = ApiError(AppError::new(kind, "x")).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
