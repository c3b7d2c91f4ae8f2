//! Validation of user request bodies and path ids.
//!
//! Bodies are checked as raw JSON first so every missing or mistyped field
//! can be reported, then converted into a typed [`UserPayload`].

use std::collections::BTreeMap;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde_json::{Map, Value};
use users_common::UserPayload;

use crate::error::ApiError;

/// Rejected request body, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Input payload validation failed")]
pub struct ValidationFailure {
    pub errors: BTreeMap<String, String>,
}

impl ValidationFailure {
    fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), reason.into());
        Self { errors }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        ApiError::Validation(failure.errors)
    }
}

/// Check that `value` is an object with string `username` and `email`.
///
/// Only presence and type are checked. Extra keys are ignored.
pub fn validate_user_payload(value: &Value) -> Result<UserPayload, ValidationFailure> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationFailure::single("payload", not_of_type(value, "object")))?;

    match (required_string(object, "username"), required_string(object, "email")) {
        (Ok(username), Ok(email)) => Ok(UserPayload::new(username, email)),
        (username, email) => {
            let errors = [("username", username), ("email", email)]
                .into_iter()
                .filter_map(|(field, result)| result.err().map(|reason| (field.to_string(), reason)))
                .collect();
            Err(ValidationFailure { errors })
        }
    }
}

fn required_string<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str, String> {
    match object.get(field) {
        None => Err(format!("'{}' is a required property", field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(not_of_type(other, "string")),
    }
}

fn not_of_type(value: &Value, expected: &str) -> String {
    format!("{} is not of type '{}'", value, expected)
}

/// Extractor yielding a validated [`UserPayload`].
///
/// Unparseable bodies are reported as validation failures too, never as
/// axum's plain-text JSON rejections.
pub struct ValidatedUser(pub UserPayload);

#[async_trait]
impl<S> FromRequest<S> for ValidatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ValidationFailure::single("payload", e.body_text()))?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ValidationFailure::single("payload", format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedUser(validate_user_payload(&value)?))
    }
}

/// `:id` path segment of `/users/:id`.
///
/// Non-numeric or out-of-range ids become a JSON 400 instead of axum's
/// plain-text path rejection.
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidId(e.body_text()))?;
        Ok(UserId(id))
    }
}
