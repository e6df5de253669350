//! Health probes over the Discord connection state.
//!
//! Liveness reports healthy unless the gateway connection is confirmed
//! closed; readiness stays 503 until the first `ready` event so traffic
//! only reaches a bot that can actually respond.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health — server metadata, always 200.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "agent": state.agent.assistant(),
        "ready": state.health.is_ready(),
    }))
}

/// GET /livez (and /healthz) — 200 unless the connection is known dead.
pub async fn livez_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.health.is_closed() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "closed" })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    }
}

/// GET /readyz — 503 until the gateway has reported ready once.
pub async fn readyz_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.health.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}
