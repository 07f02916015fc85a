pub mod ai;
pub mod auth;
pub mod dashboards;
pub mod workshop;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("{} API", state.config.app_name),
        "service": state.config.app_name,
        "version": eka_core::version(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.config.app_name,
        "timestamp": chrono::Utc::now(),
    }))
}
