//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Checks database connectivity when the catalog lives in `PostgreSQL`.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Some(pool) = state.pool()
        && sqlx::query("SELECT 1").fetch_one(pool).await.is_err()
    {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::OK
}
