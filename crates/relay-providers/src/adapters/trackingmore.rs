//! TrackingMore adapter.

use std::{future::Future, pin::Pin};

use relay_core::{Carrier, ProviderKind, ShipmentResult, TrackingRequest};
use serde_json::Value;

use super::{settle, TrackingProvider};
use crate::{
    client::ProviderClient,
    error::ProviderError,
    normalize::{self, EventFields},
    outcome::AttemptOutcome,
};

const KIND: ProviderKind = ProviderKind::TrackingMore;

const EVENT_FIELDS: EventFields = EventFields {
    id: &["id"],
    status: &["checkpoint_delivery_status", "checkpoint_delivery_substatus", "tracking_detail"],
    description: &["tracking_detail", "details"],
    timestamp: &["checkpoint_date", "Date"],
    location: &["location", "city"],
};

/// Adapter for the TrackingMore v4 API.
#[derive(Debug, Clone)]
pub struct TrackingMoreProvider {
    client: ProviderClient,
    base_url: String,
    api_key: String,
}

impl TrackingMoreProvider {
    /// Creates an adapter rooted at `base_url`.
    pub fn new(client: ProviderClient, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn lookup(&self, request: &TrackingRequest) -> Result<ShipmentResult, AttemptOutcome> {
        let url = format!("{}/trackings/get", self.base_url);
        let builder = self
            .client
            .http()
            .get(url)
            .header("Tracking-Api-Key", &self.api_key)
            .query(&[("tracking_numbers", request.tracking_id.as_str())]);

        let response = self.client.send(KIND, "get", builder).await?;
        let response = response.error_for_status().map_err(AttemptOutcome::Recoverable)?;
        let body = response
            .body
            .into_json()
            .map_err(|_| AttemptOutcome::Recoverable(ProviderError::NoData))?;

        let code = body.pointer("/meta/code").and_then(Value::as_i64);
        if code != Some(200) {
            let message = match normalize::text_at(&body, "/meta/message") {
                message if message.is_empty() => format!("meta.code {code:?}"),
                message => message,
            };
            tracing::debug!(code = ?code, message = %message, "Provider declined lookup");
            return Err(AttemptOutcome::Recoverable(ProviderError::rejected(message)));
        }

        let item = match body.get("data") {
            Some(Value::Array(items)) => items.first(),
            Some(item @ Value::Object(_)) => Some(item),
            _ => None,
        }
        .ok_or(AttemptOutcome::Recoverable(ProviderError::NoData))?;

        Ok(map_item(item, request))
    }
}

impl TrackingProvider for TrackingMoreProvider {
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

fn map_item(item: &Value, request: &TrackingRequest) -> ShipmentResult {
    let tracking_id = normalize::text(item, &["tracking_number"]);
    let mut result = ShipmentResult::new(
        if tracking_id.is_empty() { request.tracking_id.clone() } else { tracking_id },
        KIND.as_str(),
    );

    let name = normalize::text(item, &["courier_name", "courier_code"]);
    let slug = match normalize::text(item, &["courier_code"]) {
        code if code.is_empty() => normalize::slugify(&name),
        code => code,
    };
    result.carrier = Carrier { name, slug };
    result.status = normalize::text(item, &["delivery_status", "substatus"]);
    result.origin = normalize::text(item, &["origin_country", "original_country"]);
    result.destination = normalize::text(item, &["destination_country"]);

    result.events = ["/origin_info/trackinfo", "/destination_info/trackinfo"]
        .iter()
        .filter_map(|pointer| item.pointer(pointer).and_then(Value::as_array))
        .flatten()
        .map(|checkpoint| normalize::event(checkpoint, &EVENT_FIELDS))
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer) -> TrackingMoreProvider {
        TrackingMoreProvider::new(ProviderClient::with_defaults().unwrap(), &server.uri(), "tm-key")
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/trackings/get"))
            .and(matchers::header("Tracking-Api-Key", "tm-key"))
            .and(matchers::query_param("tracking_numbers", "LX123"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn request() -> TrackingRequest {
        TrackingRequest::new("LX123").unwrap()
    }

    #[tokio::test]
    async fn maps_origin_then_destination_checkpoints() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 200, "message": "Request response is successful"},
                "data": [{
                    "tracking_number": "LX123",
                    "courier_code": "dhl",
                    "delivery_status": "transit",
                    "origin_country": "CN",
                    "destination_country": "IT",
                    "origin_info": {"trackinfo": [
                        {"checkpoint_date": "2024-03-01T08:00:00+08:00",
                         "tracking_detail": "Picked up",
                         "location": "Shenzhen",
                         "checkpoint_delivery_status": "transit"}
                    ]},
                    "destination_info": {"trackinfo": [
                        {"checkpoint_date": "2024-03-05T10:00:00+01:00",
                         "tracking_detail": "Arrived at hub",
                         "checkpoint_delivery_status": "transit"}
                    ]}
                }]
            })),
        )
        .await;

        let AttemptOutcome::Success(result) = provider(&server).track(&request()).await else {
            panic!("expected success");
        };

        assert_eq!(result.provider, "trackingmore");
        assert_eq!(result.carrier, Carrier { name: "dhl".into(), slug: "dhl".into() });
        assert_eq!(result.origin, "CN");
        assert_eq!(result.destination, "IT");
        let details: Vec<&str> = result.events.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(details, vec!["Picked up", "Arrived at hub"]);
        assert_eq!(result.events[1].location, "");
    }

    #[tokio::test]
    async fn non_200_meta_code_is_recoverable() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"code": 4101, "message": "Tracking No. already exists."}
            })),
        )
        .await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(
            outcome,
            AttemptOutcome::Recoverable(ProviderError::rejected("Tracking No. already exists."))
        );
    }

    #[tokio::test]
    async fn empty_data_is_no_data() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"code": 200}, "data": []})),
        )
        .await;

        let outcome = provider(&server).track(&request()).await;
        assert_eq!(outcome, AttemptOutcome::Recoverable(ProviderError::NoData));
    }

    #[tokio::test]
    async fn http_failure_is_recoverable() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(401).set_body_string("unauthorized")).await;

        let outcome = provider(&server).track(&request()).await;
        assert!(matches!(
            outcome,
            AttemptOutcome::Recoverable(ProviderError::UpstreamStatus { status_code: 401, .. })
        ));
    }

    #[test]
    fn object_data_is_accepted() {
        let item = json!({"courier_name": "Poste Italiane", "delivery_status": "delivered"});
        let result = map_item(&item, &request());
        assert_eq!(result.tracking_id, "LX123");
        assert_eq!(result.carrier.slug, "poste-italiane");
        assert_eq!(result.status, "delivered");
        assert!(result.events.is_empty());
    }
}
