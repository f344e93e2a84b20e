//! Liveness endpoint.

use axum::{extract::State, response::IntoResponse, Json};

use boatyard_core::CURRENT_SCHEMA_VERSION;

use crate::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "schemaVersion": CURRENT_SCHEMA_VERSION,
        "store": state.backend.as_str(),
    }))
}
