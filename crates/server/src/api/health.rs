//! Health endpoint.
//!
//! Probes the queue only; the secret is never fetched here.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use notebox_queue::QueueHealth;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    pub version: String,
    #[schema(value_type = Object)]
    pub queue: QueueHealth,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, queue) = match state.queue.health_check().await {
        Ok(queue) => ("ok", queue),
        Err(e) => {
            warn!(provider = state.queue.provider(), error = %e, "Queue health check failed");
            (
                "degraded",
                QueueHealth {
                    connected: false,
                    approximate_message_count: None,
                    provider: state.queue.provider().to_string(),
                },
            )
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        queue,
    })
}
