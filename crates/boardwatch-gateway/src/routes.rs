//! API route handlers for the gateway.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::server::AppState;

/// Health check endpoint. Answers `ok` whatever the scheduler is doing,
/// including mid-cycle or after a failed poll.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "boardwatch",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Scheduler status: state, cycle count and the last cycle's summary.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.status.borrow().clone();
    Json(serde_json::json!({
        "board_id": state.board_id,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "scheduler": snapshot,
    }))
}
