//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::AppState;

/// Name reported by the liveness probe.
pub const SERVICE_NAME: &str = "parcel-relay";

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    /// Always `alive` while the process answers.
    pub status: &'static str,
    /// Time the probe was answered.
    pub timestamp: DateTime<Utc>,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Liveness check endpoint.
///
/// Never contacts a provider, so it stays cheap for load balancers.
#[instrument(name = "liveness_check", skip(state))]
pub async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Performing liveness check");

    let response = LivenessResponse {
        status: "alive",
        timestamp: DateTime::<Utc>::from(state.clock.now_system()),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}
