//! Axum server wiring.

use axum::{Router, routing::get};
use boardwatch_core::config::GatewayConfig;
use boardwatch_core::error::{BoardWatchError, Result};
use boardwatch_scheduler::SchedulerSnapshot;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::routes;

/// Shared handler state.
pub struct AppState {
    pub config: GatewayConfig,
    pub start_time: std::time::Instant,
    pub board_id: u64,
    pub status: watch::Receiver<SchedulerSnapshot>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/status", get(routes::status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server(
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BoardWatchError::config(format!("failed to bind {addr}: {e}")))?;
    tracing::info!("🌐 Gateway listening on http://{addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BoardWatchError::Other(format!("gateway server error: {e}")))
}
