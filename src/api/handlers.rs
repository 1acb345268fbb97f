//! HTTP request handlers

use super::AppState;
use crate::workflow::HandleResult;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Webhook entry point
        .route("/", post(handle_event))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

/// Receive one webhook payload. Always answers 200 with a JSON body;
/// filtered or unroutable events are reported in the body, not the status.
async fn handle_event(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<HandleResult> {
    tracing::debug!(event = %payload, "Received event");
    let result = state.workflow.handle_event(payload).await;
    tracing::debug!(result = ?result, "Handled event");
    Json(result)
}

async fn get_version() -> &'static str {
    concat!("wootbot ", env!("CARGO_PKG_VERSION"))
}
