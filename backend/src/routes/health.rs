use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use users_common::PingResponse;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ping - Liveness probe.
async fn ping() -> Json<PingResponse> {
    Json(PingResponse::pong())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping))
}
