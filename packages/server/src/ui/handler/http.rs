//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Snapshot of currently online user ids from the presence registry.
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let router = state.router.lock().await;
    Json(router.online_users())
}
