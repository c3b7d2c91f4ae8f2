//! HTTP-facing error type.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use users_common::messages;

use crate::repository::RepositoryError;

/// Everything a users handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field name to reason, one entry per offending field.
    #[error("Input payload validation failed")]
    Validation(BTreeMap<String, String>),

    /// Path id that is not an integer.
    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("User {0} does not exist")]
    NotFound(i64),

    #[error("Sorry. That email already exists.")]
    DuplicateEmail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail(email) => ApiError::DuplicateEmail(email),
            RepositoryError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": messages::MSG_VALIDATION_FAILED,
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": self.to_string() }))).into_response()
            }
            ApiError::InvalidId(_) | ApiError::DuplicateEmail(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": self.to_string() }))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": messages::MSG_INTERNAL_ERROR })),
                )
                    .into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
