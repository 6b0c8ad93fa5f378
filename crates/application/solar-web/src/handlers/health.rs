use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.listing.snapshot().await;
    Json(json!({
        "status": "ok",
        "store": state.store_backend,
        "auth": state.auth.name(),
        "installers": snapshot.installers.len(),
        "email_configured": state.relay.is_configured(),
    }))
}
