//! 17Track adapter.

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

const KIND: ProviderKind = ProviderKind::Track17;

const EVENT_FIELDS: EventFields = EventFields {
    id: &["id"],
    status: &["stage", "sub_status", "description"],
    description: &["description"],
    timestamp: &["time_iso", "time_utc", "time_raw"],
    location: &["location", "address"],
};

/// Adapter for the 17Track v2.2 API.
#[derive(Debug, Clone)]
pub struct Track17Provider {
    client: ProviderClient,
    base_url: String,
    api_key: String,
}

impl Track17Provider {
    /// Creates an adapter rooted at `base_url`.
    pub fn new(client: ProviderClient, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn lookup(&self, request: &TrackingRequest) -> Result<ShipmentResult, AttemptOutcome> {
        let builder = self
            .client
            .http()
            .post(format!("{}/gettrackinfo", self.base_url))
            .header("17token", &self.api_key)
            .json(&json!([{ "number": request.tracking_id }]));

        let response = self.client.send(KIND, "gettrackinfo", builder).await?;
        let response = response.error_for_status().map_err(AttemptOutcome::Recoverable)?;
        let body = response
            .body
            .into_json()
            .map_err(|_| AttemptOutcome::Recoverable(ProviderError::NoData))?;

        let code = body.get("code").and_then(Value::as_i64);
        if code != Some(0) {
            tracing::debug!(code = ?code, "Provider declined lookup");
            return Err(AttemptOutcome::Recoverable(ProviderError::rejected(format!(
                "17track code {}",
                code.map_or_else(|| "missing".to_string(), |code| code.to_string())
            ))));
        }

        let accepted = body
            .pointer("/data/accepted/0")
            .ok_or(AttemptOutcome::Recoverable(ProviderError::NoData))?;

        map_accepted(accepted, request).ok_or(AttemptOutcome::Recoverable(ProviderError::NoData))
    }
}

impl TrackingProvider for Track17Provider {
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

/// Returns `None` for a number 17Track accepted but has not tracked yet.
fn map_accepted(accepted: &Value, request: &TrackingRequest) -> Option<ShipmentResult> {
    if !accepted.get("track_info").is_some_and(Value::is_object) {
        return None;
    }

    let tracking_id = normalize::text(accepted, &["number"]);
    let mut result = ShipmentResult::new(
        if tracking_id.is_empty() { request.tracking_id.clone() } else { tracking_id },
        KIND.as_str(),
    );

    result.status = normalize::text_at(accepted, "/track_info/latest_status/status");
    result.origin =
        normalize::text_at(accepted, "/track_info/shipping_info/shipper_address/country");
    result.destination =
        normalize::text_at(accepted, "/track_info/shipping_info/recipient_address/country");

    let providers = accepted
        .pointer("/track_info/tracking/providers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    if let Some(first) = providers.first() {
        let name = normalize::text_at(first, "/provider/name");
        let slug = normalize::slugify(&name);
        result.carrier = Carrier { name, slug };
    }

    result.events = providers
        .iter()
        .flat_map(|provider| normalize::array(provider, &["events"]))
        .map(|event| normalize::event(event, &EVENT_FIELDS))
        .collect();

    if result.status.is_empty() && result.events.is_empty() {
        return None;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer) -> Track17Provider {
        Track17Provider::new(ProviderClient::with_defaults().unwrap(), &server.uri(), "17-key")
    }

    async fn mount(server: &MockServer, body: Value) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/gettrackinfo"))
            .and(matchers::header("17token", "17-key"))
            .and(matchers::body_json(json!([{"number": "YT2403"}])))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn request() -> TrackingRequest {
        TrackingRequest::new("YT2403").unwrap()
    }

    #[tokio::test]
    async fn maps_accepted_tracking() {
        let server = MockServer::start().await;
        mount(
            &server,
            json!({
                "code": 0,
                "data": {
                    "accepted": [{
                        "number": "YT2403",
                        "track_info": {
                            "latest_status": {"status": "InTransit"},
                            "shipping_info": {
                                "shipper_address": {"country": "CN"},
                                "recipient_address": {"country": "IT"}
                            },
                            "tracking": {"providers": [{
                                "provider": {"key": 190271, "name": "Yun Express"},
                                "events": [
                                    {"time_iso": "2024-03-02T10:00:00+08:00",
                                     "description": "Departed", "location": "Shenzhen",
                                     "stage": "InTransit"},
                                    {"time_iso": "2024-03-01T10:00:00+08:00",
                                     "description": "Info received", "stage": "InfoReceived"}
                                ]
                            }]}
                        }
                    }],
                    "rejected": []
                }
            }),
        )
        .await;

        let AttemptOutcome::Success(result) = provider(&server).track(&request()).await else {
            panic!("expected success");
        };

        assert_eq!(result.provider, "17track");
        assert_eq!(result.status, "InTransit");
        assert_eq!(
            result.carrier,
            Carrier { name: "Yun Express".into(), slug: "yun-express".into() }
        );
        assert_eq!(result.origin, "CN");
        assert_eq!(result.destination, "IT");
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].timestamp, "2024-03-02T10:00:00+08:00");
        assert_eq!(result.events[1].status, "InfoReceived");
        assert_eq!(result.events[1].location, "");
    }

    #[tokio::test]
    async fn nonzero_code_is_recoverable() {
        let server = MockServer::start().await;
        mount(&server, json!({"code": -18019901, "data": {}})).await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(
            outcome,
            AttemptOutcome::Recoverable(ProviderError::rejected("17track code -18019901"))
        );
    }

    #[tokio::test]
    async fn empty_accepted_is_no_data() {
        let server = MockServer::start().await;
        mount(
            &server,
            json!({"code": 0, "data": {"accepted": [], "rejected": [{"number": "YT2403"}]}}),
        )
        .await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(outcome, AttemptOutcome::Recoverable(ProviderError::NoData));
    }

    #[tokio::test]
    async fn accepted_without_track_info_is_no_data() {
        let server = MockServer::start().await;
        mount(&server, json!({"code": 0, "data": {"accepted": [{"number": "YT2403"}]}})).await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(outcome, AttemptOutcome::Recoverable(ProviderError::NoData));
    }

    #[tokio::test]
    async fn empty_track_info_is_no_data() {
        let server = MockServer::start().await;
        mount(
            &server,
            json!({"code": 0, "data": {"accepted": [{
                "number": "YT2403",
                "track_info": {"tracking": {"providers": []}}
            }]}}),
        )
        .await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(outcome, AttemptOutcome::Recoverable(ProviderError::NoData));
    }

    #[tokio::test]
    async fn server_error_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = provider(&server).track(&request()).await;
        assert!(matches!(
            outcome,
            AttemptOutcome::Recoverable(ProviderError::UpstreamStatus { status_code: 500, .. })
        ));
    }

    #[test]
    fn identical_payloads_normalize_identically() {
        let accepted = json!({
            "number": "YT2403",
            "track_info": {"tracking": {"providers": [{"events": [{"description": "x"}]}]}}
        });
        let first = serde_json::to_vec(&map_accepted(&accepted, &request())).unwrap();
        let second = serde_json::to_vec(&map_accepted(&accepted, &request())).unwrap();
        assert_eq!(first, second);
    }
}
