pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod routes;
pub mod test_util;
pub mod validation;

pub use crate::config::Config;
pub use error::ApiError;
pub use models::User;
pub use repository::{RepositoryError, SqliteUserRepository, UserRepository};

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// User storage, injected at startup (SQLite in production, mocks in tests).
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(config: Config, users: Arc<dyn UserRepository>) -> Self {
        Self { config, users }
    }
}

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .layer(middleware::from_fn(logging::request_logger))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.allowed_origins() {
        None => cors.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            cors.allow_origin(AllowOrigin::list(origins))
        }
    }
}
