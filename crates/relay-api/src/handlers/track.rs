//! Tracking lookup endpoint.
//!
//! Serves `GET /api/track` and its aliases. The handler validates the query,
//! then either answers from the diagnostic report, from mock data, or by
//! running provider selection and fallback.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{RelayError, RequestedProvider, ShipmentResult, TrackingRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{error::ApiError, handlers::diagnostics, mock, state::AppState};

/// Query parameters accepted by the tracking endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    /// Tracking code, required unless `test` is set.
    pub tracking: Option<String>,
    /// Optional destination country code.
    pub destination_country: Option<String>,
    /// Optional language for provider descriptions.
    pub language: Option<String>,
    /// `true`, `1` or `yes` switches to the diagnostic report.
    pub test: Option<String>,
    /// Per-request override of the configured provider selection.
    pub provider: Option<String>,
}

impl TrackQuery {
    /// Whether the caller asked for the diagnostic report.
    pub fn is_diagnostic(&self) -> bool {
        self.test.as_deref().map(str::trim).is_some_and(|flag| {
            ["true", "1", "yes"].iter().any(|accepted| flag.eq_ignore_ascii_case(accepted))
        })
    }
}

/// Response metadata mirrored from the shipment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// `false` advises polling again later.
    pub done: bool,
    /// Whether the provider answered from its cache.
    pub from_cache: bool,
    /// Provider that produced the result.
    pub provider: String,
}

/// Successful tracking response body.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    /// Normalized shipment.
    #[serde(flatten)]
    pub shipment: ShipmentResult,
    /// Response metadata.
    #[serde(rename = "_meta")]
    pub meta: ResponseMeta,
}

impl From<ShipmentResult> for TrackResponse {
    fn from(shipment: ShipmentResult) -> Self {
        let meta = ResponseMeta {
            done: shipment.done,
            from_cache: shipment.from_cache,
            provider: shipment.provider.clone(),
        };
        Self { shipment, meta }
    }
}

/// Tracking lookup handler.
///
/// Returns appropriate HTTP status codes:
/// - 400: Missing tracking id, unknown provider or undecodable query
/// - 500: No provider configured, or the requested one has no credentials
/// - 502: Every candidate provider failed
/// - 504: The last candidate timed out
/// - upstream status: A terminal provider failure with a known status
#[instrument(name = "track_shipment", skip(state, query))]
pub async fn track_shipment(
    State(state): State<AppState>,
    query: Result<Query<TrackQuery>, QueryRejection>,
) -> Response {
    let expose_details = !state.config.is_production();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            let err = RelayError::InvalidQuery { message: rejection.body_text() };
            return ApiError::new(err, expose_details).into_response();
        },
    };

    if query.is_diagnostic() {
        debug!("Serving diagnostic report");
        return diagnostics::build_report(&state).await.into_response();
    }

    match lookup(&state, &query).await {
        Ok(shipment) => {
            info!(
                provider = %shipment.provider,
                events = shipment.events.len(),
                done = shipment.done,
                "Tracking lookup succeeded"
            );
            (StatusCode::OK, Json(TrackResponse::from(shipment))).into_response()
        },
        Err(err) => ApiError::new(err, expose_details).into_response(),
    }
}

async fn lookup(state: &AppState, query: &TrackQuery) -> Result<ShipmentResult, RelayError> {
    let request = TrackingRequest::new(query.tracking.as_deref().unwrap_or_default())?
        .with_destination_country(query.destination_country.as_deref())
        .with_language(query.language.as_deref());

    let requested = match query.provider.as_deref() {
        Some(raw) => raw.parse::<RequestedProvider>()?,
        None => state.config.requested_provider()?,
    };
    let request = request.with_requested_provider(requested);

    if state.config.mock_mode() {
        debug!(tracking_id = %request.tracking_id, "Serving mock shipment");
        return Ok(mock::mock_shipment(&request));
    }

    state.service.track(&request).await
}

/// CORS preflight handler: `200` with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
