//! UPS adapter.
//!
//! Every lookup exchanges the client credentials for a short-lived bearer
//! token, then calls the Track API with it. Tokens are not cached between
//! lookups.

use std::{future::Future, pin::Pin};

use chrono::{NaiveDate, NaiveTime};
use relay_core::{Carrier, ProviderKind, ShipmentResult, TrackingEvent, TrackingRequest};
use reqwest::Url;
use serde_json::Value;
use uuid::Uuid;

use super::{settle, TrackingProvider};
use crate::{client::ProviderClient, error::ProviderError, normalize, outcome::AttemptOutcome};

const KIND: ProviderKind = ProviderKind::Ups;

/// Value of the `transactionSrc` header on data calls.
const TRANSACTION_SOURCE: &str = "parcel-relay";

/// Adapter for the UPS OAuth and Track APIs.
#[derive(Debug, Clone)]
pub struct UpsProvider {
    client: ProviderClient,
    base_url: String,
    access_key: String,
    user_id: String,
    password: String,
}

impl UpsProvider {
    /// Creates an adapter rooted at `base_url`.
    pub fn new(
        client: ProviderClient,
        base_url: &str,
        access_key: &str,
        user_id: &str,
        password: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            user_id: user_id.to_string(),
            password: password.to_string(),
        }
    }

    async fn access_token(&self) -> Result<String, AttemptOutcome> {
        let builder = self
            .client
            .http()
            .post(format!("{}/security/v1/oauth/token", self.base_url))
            .basic_auth(&self.user_id, Some(&self.password))
            .header("x-merchant-id", &self.access_key)
            .form(&[("grant_type", "client_credentials")]);

        let response = self.client.send(KIND, "token", builder).await?;
        if !response.is_success {
            return Err(AttemptOutcome::Recoverable(ProviderError::authentication(format!(
                "token endpoint returned HTTP {}",
                response.status_code
            ))));
        }

        response
            .body
            .json()
            .map(|body| normalize::text(body, &["access_token"]))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AttemptOutcome::Recoverable(ProviderError::authentication(
                    "no access_token in token response",
                ))
            })
    }

    /// Details URL with the tracking id as one percent-encoded path segment.
    fn details_url(&self, tracking_id: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::configuration(format!("invalid UPS base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::configuration("UPS base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "track", "v1", "details", tracking_id]);
        Ok(url)
    }

    async fn lookup(&self, request: &TrackingRequest) -> Result<ShipmentResult, AttemptOutcome> {
        let url = self.details_url(&request.tracking_id)?;
        let token = self.access_token().await?;

        let builder = self
            .client
            .http()
            .get(url)
            .bearer_auth(token)
            .header("transId", Uuid::new_v4().simple().to_string())
            .header("transactionSrc", TRANSACTION_SOURCE)
            .query(&[("locale", locale(&request.language))]);

        let response = self.client.send(KIND, "details", builder).await?;
        let response = response.error_for_status().map_err(AttemptOutcome::Recoverable)?;
        let body = response
            .body
            .into_json()
            .map_err(|_| AttemptOutcome::Recoverable(ProviderError::NoData))?;

        map_response(&body, request).ok_or(AttemptOutcome::Recoverable(ProviderError::NoData))
    }
}

impl TrackingProvider for UpsProvider {
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

/// Maps a request language onto a UPS locale.
fn locale(language: &str) -> &'static str {
    match language.to_ascii_lowercase().as_str() {
        "it" => "it_IT",
        "de" => "de_DE",
        "fr" => "fr_FR",
        "es" => "es_ES",
        _ => "en_US",
    }
}

fn map_response(body: &Value, request: &TrackingRequest) -> Option<ShipmentResult> {
    let package = body.pointer("/trackResponse/shipment/0/package/0")?;

    let tracking_id = normalize::text(package, &["trackingNumber"]);
    let mut result = ShipmentResult::new(
        if tracking_id.is_empty() { request.tracking_id.clone() } else { tracking_id },
        KIND.as_str(),
    );
    result.carrier = Carrier { name: "UPS".to_string(), slug: "ups".to_string() };
    result.events = normalize::array(package, &["activity"]).iter().map(activity).collect();
    result.status = match normalize::text_at(package, "/currentStatus/description") {
        status if status.is_empty() => {
            result.events.first().map(|event| event.description.clone()).unwrap_or_default()
        },
        status => status,
    };

    for entry in normalize::array(package, &["packageAddress"]) {
        match normalize::text(entry, &["type"]).as_str() {
            "ORIGIN" => result.origin = normalize::address(entry),
            "DESTINATION" => result.destination = normalize::address(entry),
            _ => {},
        }
    }

    Some(result)
}

fn activity(value: &Value) -> TrackingEvent {
    let description = normalize::text_at(value, "/status/description");
    let status = match normalize::text_at(value, "/status/type").as_str() {
        "D" => "Delivered".to_string(),
        "I" => "In Transit".to_string(),
        "X" => "Exception".to_string(),
        "P" => "Pickup".to_string(),
        "M" => "Manifest".to_string(),
        _ => description.clone(),
    };

    TrackingEvent {
        id: String::new(),
        status,
        description,
        timestamp: timestamp(
            &normalize::text(value, &["date"]),
            &normalize::text(value, &["time"]),
        ),
        location: normalize::location(value, &["location"]),
    }
}

/// Renders UPS `YYYYMMDD` and `HHMMSS` fields as an ISO-8601 local time.
fn timestamp(date: &str, time: &str) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date, "%Y%m%d") else {
        return format!("{date}{time}");
    };
    match NaiveTime::parse_from_str(time, "%H%M%S") {
        Ok(clock) => day.and_time(clock).format("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(_) => day.format("%Y-%m-%d").to_string(),
    }
}
