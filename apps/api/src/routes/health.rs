use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Service name and version.
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": state.config.app_name,
        "version": state.config.app_version,
        "status": "running"
    }))
}

/// GET /favicon.ico
pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
