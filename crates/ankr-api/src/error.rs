//! API error types and JSON error response formatting.
//!
//! Every failure is rendered as `{ "error": CODE, "message": text }` with the
//! status code the error code implies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use ankr_action::LifecycleError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g. "BAD_REQUEST", "NOT_FOUND").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 - malformed or missing input, caught before any mutation.
    #[error("{0}")]
    BadRequest(String),
    /// 404 - the id does not resolve to a row.
    #[error("{0}")]
    NotFound(String),
    /// 403 - endpoint disabled by configuration.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    DbFetchFailed(String),
    #[error("{0}")]
    DbUpdateFailed(String),
    /// 500 - the execute pipeline itself failed (not an executor reporting
    /// `failed`, which is a normal outcome).
    #[error("{0}")]
    ExecuteFailed(String),
    /// 500 - the pump could not select its batch.
    #[error("{0}")]
    PumpFailed(String),
    #[error("{0}")]
    ListFailed(String),
    #[error("{0}")]
    CreateFailed(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::DbFetchFailed(_) => "DB_FETCH_FAILED",
            ApiError::DbUpdateFailed(_) => "DB_UPDATE_FAILED",
            ApiError::ExecuteFailed(_) => "EXECUTE_FAILED",
            ApiError::PumpFailed(_) => "PUMP_FAILED",
            ApiError::ListFailed(_) => "LIST_FAILED",
            ApiError::CreateFailed(_) => "CREATE_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a lifecycle error, using `plumbing` for everything except a
    /// missing row. Each endpoint reports store failures under its own code.
    pub fn lifecycle(err: LifecycleError, plumbing: fn(String) -> ApiError) -> Self {
        match err {
            LifecycleError::NotFound(id) => {
                ApiError::NotFound(format!("Action call not found: {}", id))
            }
            other => plumbing(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ankr_core::error::AnkrError;
    use uuid::Uuid;

    #[test]
    fn test_codes_and_statuses() {
        let cases = [
            (ApiError::BadRequest(String::new()), "BAD_REQUEST", StatusCode::BAD_REQUEST),
            (ApiError::NotFound(String::new()), "NOT_FOUND", StatusCode::NOT_FOUND),
            (ApiError::Forbidden(String::new()), "FORBIDDEN", StatusCode::FORBIDDEN),
            (
                ApiError::DbUpdateFailed(String::new()),
                "DB_UPDATE_FAILED",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::PumpFailed(String::new()),
                "PUMP_FAILED",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Internal(String::new()),
                "INTERNAL_ERROR",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn test_lifecycle_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        let err = ApiError::lifecycle(LifecycleError::NotFound(id), ApiError::DbUpdateFailed);
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg.contains(&id.to_string())));
    }

    #[test]
    fn test_lifecycle_store_error_uses_endpoint_code() {
        let err = ApiError::lifecycle(
            LifecycleError::Store(AnkrError::Storage("no such table".to_string())),
            ApiError::ExecuteFailed,
        );
        assert_eq!(err.code(), "EXECUTE_FAILED");
        assert!(err.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_into_response_json_body() {
        let resp = ApiError::Forbidden("listing disabled".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "FORBIDDEN");
        assert_eq!(body.message, "listing disabled");
    }
}
