//! Error types for tsuzuri-api
//!
//! Every handler error is rendered as JSON `{"error": <code>, "detail": <message>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Password rejected by policy (400), with the individual rule messages
    #[error("Password policy violated")]
    PasswordPolicy(Vec<String>),

    /// No valid session (401)
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// CSRF check failed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Generative service failed (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// tsuzuri-common error
    #[error("Common error: {0}")]
    Common(#[from] tsuzuri_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::PasswordPolicy(errors) => {
                let body = Json(json!({
                    "error": "password_policy",
                    "detail": "Password does not meet the policy",
                    "errors": errors,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::Common(err) => match err {
                tsuzuri_common::Error::InvalidInput(msg) | tsuzuri_common::Error::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, "bad_request", msg)
                }
                tsuzuri_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
                other => {
                    error!("Internal error: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        other.to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": error_code,
            "detail": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let response = ApiError::Upstream("timeout".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn conflict_maps_to_bad_request() {
        let err: ApiError = tsuzuri_common::Error::Conflict("email".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_maps_to_internal() {
        let err: ApiError = tsuzuri_common::Error::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
