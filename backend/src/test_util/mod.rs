//! Helpers shared by unit and integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::config::{Config, CorsConfig, DatabaseConfig, LoggingConfig, ServerConfig};
use crate::models::User;
use crate::repository::{SqliteUserRepository, UserRepository};
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig {
            origins: "*".to_string(),
        },
    }
}

pub fn test_state(users: Arc<dyn UserRepository>) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), users))
}

/// State backed by a fresh in-memory SQLite database.
///
/// The repository is returned as well so tests can seed rows directly.
pub fn sqlite_state() -> (Arc<AppState>, Arc<SqliteUserRepository>) {
    let repo = Arc::new(
        SqliteUserRepository::in_memory().expect("Failed to open in-memory database"),
    );
    (test_state(repo.clone()), repo)
}

pub fn add_user(repo: &dyn UserRepository, username: &str, email: &str) -> User {
    repo.create(username, email).expect("Failed to seed user")
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request")
}

/// Status and JSON body of a response.
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");
    (status, body)
}
