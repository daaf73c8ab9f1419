//! REST handlers, one module per resource.

pub mod answers;
pub mod auth;
pub mod health;
pub mod likes;
pub mod members;
pub mod questions;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use qanda_core::CoreError;

/// Error payload returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Newtype wrapper to implement `IntoResponse` for `CoreError` (orphan rule
/// workaround).
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self.0 {
            CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            CoreError::AlreadyExists { .. } => (StatusCode::CONFLICT, "already_exists"),
            CoreError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized_operation"),
            CoreError::InvalidState { .. } => (StatusCode::FORBIDDEN, "invalid_state"),
            CoreError::ExpiredToken => (StatusCode::UNAUTHORIZED, "token_expired"),
            CoreError::InvalidSignature => (StatusCode::UNAUTHORIZED, "invalid_token"),
            CoreError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            CoreError::StorageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            CoreError::Internal { .. } | CoreError::IoError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        let cases = [
            (CoreError::not_found("question", "x"), StatusCode::NOT_FOUND),
            (CoreError::already_exists("member", "x"), StatusCode::CONFLICT),
            (CoreError::unauthorized("nope"), StatusCode::FORBIDDEN),
            (CoreError::invalid_state("answered"), StatusCode::FORBIDDEN),
            (CoreError::ExpiredToken, StatusCode::UNAUTHORIZED),
            (CoreError::InvalidSignature, StatusCode::UNAUTHORIZED),
            (CoreError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                CoreError::StorageError("disk".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
