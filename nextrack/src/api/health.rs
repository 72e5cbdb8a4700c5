//! Service hello and health endpoints

use axum::Json;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Health check endpoint for monitoring.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "nextrack".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Hello response
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub status: String,
    pub message: String,
}

/// GET /
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        status: "alive".to_string(),
        message: "welcome to nextrack, the next-track music recommender".to_string(),
    })
}
