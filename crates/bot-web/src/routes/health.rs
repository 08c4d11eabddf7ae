//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness probe: reports the app name and how many clubs are loaded.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "app": state.app_name,
        "clubs": state.engine.registry().contexts().len(),
    }))
}
