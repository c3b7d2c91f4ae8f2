//! JSON bodies exchanged on the `/users` endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub email: String,
}

impl UserPayload {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

/// A user as rendered by `GET /users` and `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Body carrying a single human-readable message.
///
/// Used for confirmations (`"<email> was added!"`) as well as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub message: String,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            status: "success".to_string(),
            message: "pong!".to_string(),
        }
    }
}
