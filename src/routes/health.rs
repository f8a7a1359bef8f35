use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::ApiResult;
use crate::state::ServerState;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "grimoire",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}

/// Readiness check endpoint: verifies the store answers queries.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let store_status = match tokio::task::spawn_blocking(move || store.list_books()).await {
        Ok(Ok(_)) => "ready",
        _ => "unavailable",
    };

    Ok(Json(json!({
        "status": if store_status == "ready" { "ready" } else { "degraded" },
        "service": "grimoire",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "api": "ready",
            "store": store_status,
        }
    })))
}
