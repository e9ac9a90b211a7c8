//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
    live_subscribers: usize,
    verdicts_broadcast: u64,
    timestamp: i64,
}

/// Liveness plus hub counters. Does not probe the store.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.config.storage_backend.as_str(),
        live_subscribers: state.hub.subscriber_count(),
        verdicts_broadcast: state.hub.published(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
