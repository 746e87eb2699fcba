//! ParcelsApp adapter.
//!
//! ParcelsApp is asynchronous: a create call registers the lookup and returns
//! a correlation id, and a second call fetches the result for that id. When
//! the create call already carries cached shipments they are used directly.

use std::{future::Future, pin::Pin};

use relay_core::{Carrier, ProviderKind, ShipmentResult, TrackingRequest};
use serde_json::{json, Value};

use super::{settle, TrackingProvider};
use crate::{
    client::ProviderClient,
    error::ProviderError,
    normalize::{self, EventFields},
    outcome::AttemptOutcome,
};

const KIND: ProviderKind = ProviderKind::ParcelsApp;

/// Keys that may carry the correlation id of a created lookup.
const CORRELATION_KEYS: &[&str] = &["uuid", "id", "trackingId", "requestId"];

const EVENT_FIELDS: EventFields = EventFields {
    id: &["id", "eventId"],
    status: &["status", "state", "description"],
    description: &["description", "status", "message"],
    timestamp: &["date", "time", "timestamp"],
    location: &["location", "place"],
};

/// Adapter for the ParcelsApp v3 API.
#[derive(Debug, Clone)]
pub struct ParcelsAppProvider {
    client: ProviderClient,
    base_url: String,
    api_key: String,
}

impl ParcelsAppProvider {
    /// Creates an adapter rooted at `base_url`.
    pub fn new(client: ProviderClient, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/shipments/tracking", self.base_url)
    }

    async fn lookup(&self, request: &TrackingRequest) -> Result<ShipmentResult, AttemptOutcome> {
        let mut shipment = json!({ "trackingId": request.tracking_id });
        if let Some(country) = &request.destination_country {
            shipment["destinationCountry"] = json!(country);
        }
        let payload = json!({
            "apiKey": self.api_key,
            "shipments": [shipment],
            "language": request.language,
        });

        let created = self
            .client
            .send(KIND, "create", self.client.http().post(self.endpoint()).json(&payload))
            .await?;

        if let Some(code) = created.body.json().and_then(declared_error) {
            return Err(classify_error(&code));
        }
        if !created.is_success {
            return Err(AttemptOutcome::Recoverable(ProviderError::upstream_status(
                created.status_code,
                created.body.preview(),
            )));
        }

        if let Some(body) = created.body.json() {
            if !normalize::array(body, &["shipments"]).is_empty() {
                tracing::debug!("Create call returned cached shipments");
                return map_result(body, request);
            }
        }

        let uuid = created
            .body
            .json()
            .map(|body| normalize::text(body, CORRELATION_KEYS))
            .filter(|uuid| !uuid.is_empty())
            .ok_or(AttemptOutcome::Recoverable(ProviderError::MissingCorrelationId))?;

        tracing::debug!(uuid = %uuid, "Polling created lookup");

        let polled = self
            .client
            .send(
                KIND,
                "poll",
                self.client
                    .http()
                    .get(self.endpoint())
                    .query(&[("uuid", uuid.as_str()), ("apiKey", self.api_key.as_str())]),
            )
            .await?;

        let polled = polled.error_for_status().map_err(AttemptOutcome::Fatal)?;
        let body = polled.body.into_json().map_err(AttemptOutcome::Fatal)?;

        if let Some(code) = declared_error(&body) {
            return Err(classify_error(&code));
        }

        map_result(&body, request)
    }
}

impl TrackingProvider for ParcelsAppProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    fn track<'a>(
        &'a self,
        request: &'a TrackingRequest,
    ) -> Pin<Box<dyn Future<Output = AttemptOutcome> + Send + 'a>> {
        Box::pin(async move { settle(self.lookup(request).await) })
    }
}

/// Returns the provider's `error` field, if any.
fn declared_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(code) if code.trim().is_empty() => None,
        Value::String(code) => Some(code.trim().to_string()),
        Value::Object(inner) => Some(
            ["code", "message"]
                .iter()
                .find_map(|key| inner.get(*key).and_then(Value::as_str))
                .unwrap_or("UNKNOWN_ERROR")
                .to_string(),
        ),
        other => Some(other.to_string()),
    }
}

/// Maps a declared ParcelsApp error code to an attempt outcome.
fn classify_error(code: &str) -> AttemptOutcome {
    match code.to_ascii_uppercase().as_str() {
        "SUBSCRIPTION_LIMIT_REACHED" => {
            AttemptOutcome::Recoverable(ProviderError::QuotaExhausted { code: code.to_string() })
        },
        "INVALID_API_KEY" | "UNAUTHORIZED" => {
            AttemptOutcome::Fatal(ProviderError::InvalidCredentials)
        },
        "INVALID_TRACKING_ID" => AttemptOutcome::Fatal(ProviderError::InvalidTrackingId),
        "NO_UUID" => AttemptOutcome::Recoverable(ProviderError::MissingCorrelationId),
        _ => AttemptOutcome::Fatal(ProviderError::rejected(code)),
    }
}

fn map_result(body: &Value, request: &TrackingRequest) -> Result<ShipmentResult, AttemptOutcome> {
    let done = normalize::flag(body, &["done"], true);
    let from_cache = normalize::flag(body, &["fromCache", "from_cache"], false);

    let Some(shipment) = normalize::array(body, &["shipments"]).first() else {
        if done {
            return Err(AttemptOutcome::Recoverable(ProviderError::NoData));
        }
        let mut pending = ShipmentResult::new(&request.tracking_id, KIND.as_str());
        pending.done = false;
        pending.from_cache = from_cache;
        return Ok(pending);
    };

    let tracking_id = normalize::text(shipment, &["trackingId", "tracking_id"]);
    let mut result = ShipmentResult::new(
        if tracking_id.is_empty() { request.tracking_id.clone() } else { tracking_id },
        KIND.as_str(),
    );

    result.carrier = carrier(shipment);
    result.status = normalize::text(shipment, &["status", "state"]);
    result.origin = normalize::text(shipment, &["origin", "originCountry", "origin_country"]);
    result.destination =
        normalize::text(shipment, &["destination", "destinationCountry", "destination_country"]);

    let states = match normalize::array(shipment, &["states"]) {
        [] => normalize::array(shipment, normalize::EVENT_LIST_KEYS),
        states => states,
    };
    result.events = states.iter().map(|state| normalize::event(state, &EVENT_FIELDS)).collect();
    result.done = done;
    result.from_cache = from_cache;

    Ok(result)
}

fn carrier(shipment: &Value) -> Carrier {
    if let Some(detected) = shipment.get("detectedCarrier").filter(|v| v.is_object()) {
        let name = normalize::text(detected, &["name"]);
        let slug = match normalize::text(detected, &["slug"]) {
            slug if slug.is_empty() => normalize::slugify(&name),
            slug => slug,
        };
        if !name.is_empty() || !slug.is_empty() {
            return Carrier { name, slug };
        }
    }

    let name = normalize::array(shipment, &["carriers"])
        .first()
        .map(|first| match first {
            Value::Object(_) => normalize::text(first, &["name", "slug"]),
            other => other.as_str().unwrap_or_default().trim().to_string(),
        })
        .unwrap_or_default();
    let slug = normalize::slugify(&name);

    Carrier { name, slug }
}
