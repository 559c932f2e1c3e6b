use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::infra::http::models::HealthResponse;
use crate::infra::http::state::ApiState;

/// Liveness plus a best-effort upstream probe. The process stays "ok" even
/// when the upstream is down because cached data may still be served.
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let upstream_up = state.gateway.is_healthy().await;

    Json(HealthResponse {
        status: "ok",
        upstream: if upstream_up { "up" } else { "down" },
    })
}
