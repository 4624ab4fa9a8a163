use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` while a configured remote tier is unreachable.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether a remote database is configured at all.
    pub remote_configured: bool,
    /// Whether the remote database answered within the read timeout.
    pub remote_healthy: bool,
}

/// GET /health -- returns service and storage health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let remote_healthy = match &state.pool {
        Some(pool) => matches!(
            tokio::time::timeout(
                state.config.storage.timeouts.read,
                tablebuilder_db::health_check(pool),
            )
            .await,
            Ok(Ok(()))
        ),
        None => false,
    };
    let remote_configured = state.pool.is_some();

    let status = if remote_configured && !remote_healthy {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        remote_configured,
        remote_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
