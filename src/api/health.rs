//! Liveness and readiness probes
//!
//! `/health` only proves the process answers requests; `/ready` additionally
//! pings the store, so an instance with a lost database connection drops out
//! of rotation.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::HealthStore, AppState};

#[derive(Serialize, ToSchema)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl ProbeResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = ProbeResponse)
    )
)]
pub async fn health_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("healthy"))
}

/// Readiness probe. Fails when the store does not answer.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Store is reachable", body = ProbeResponse),
        (status = 500, description = "Store did not answer")
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<ProbeResponse>> {
    state.store.ping().await?;
    Ok(Json(ProbeResponse::new("ready")))
}
