//! Mock provider servers.
//!
//! `ProviderMock` wraps a `wiremock` server and mounts endpoints shaped like
//! each provider's real API, matching the credentials from
//! `test_credentials`.

use std::time::Duration;

use relay_core::{ProviderConfig, ProviderKind};
use serde_json::Value;
use wiremock::{
    matchers::{any, body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::{fixtures, provider_config};

/// API key expected by key-authenticated mock endpoints.
pub const API_KEY: &str = "test-api-key";

/// UPS access key expected by the mock token endpoint.
pub const UPS_ACCESS_KEY: &str = "test-ups-access-key";

/// Bearer token issued by the mock UPS token endpoint.
pub const UPS_TOKEN: &str = "test-ups-token";

/// Correlation id returned by the mock ParcelsApp create endpoint.
pub const PARCELS_UUID: &str = "test-parcels-uuid";

/// Mock server standing in for one tracking provider.
pub struct ProviderMock {
    server: MockServer,
    kind: ProviderKind,
}

impl ProviderMock {
    /// Starts a mock for `kind` on a random port.
    pub async fn start(kind: ProviderKind) -> Self {
        Self { server: MockServer::start().await, kind }
    }

    /// Base URL of the mock server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Provider this mock stands in for.
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Credentialed configuration pointing at this mock.
    pub fn config(&self) -> ProviderConfig {
        provider_config(self.kind, &self.url())
    }

    /// Underlying server, for tests that mount their own mocks.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Mounts the provider's happy path for `tracking_id`.
    pub async fn respond_with_shipment(&self, tracking_id: &str) {
        match self.kind {
            ProviderKind::ParcelsApp => {
                self.parcels_create(fixtures::parcels_created(PARCELS_UUID)).await;
                self.parcels_poll(fixtures::parcels_shipment(tracking_id)).await;
            },
            ProviderKind::TrackingMore => {
                self.trackingmore(fixtures::trackingmore_tracking(tracking_id)).await;
            },
            ProviderKind::Ups => {
                self.ups_token(fixtures::ups_token(UPS_TOKEN)).await;
                self.ups_details(tracking_id, fixtures::ups_details(tracking_id)).await;
            },
            ProviderKind::Track17 => self.track17(fixtures::track17_accepted(tracking_id)).await,
        }
    }

    /// Mounts the ParcelsApp create endpoint.
    pub async fn parcels_create(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/shipments/tracking"))
            .and(body_partial_json(serde_json::json!({"apiKey": API_KEY})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts the ParcelsApp poll endpoint for `PARCELS_UUID`.
    pub async fn parcels_poll(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/shipments/tracking"))
            .and(query_param("uuid", PARCELS_UUID))
            .and(query_param("apiKey", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts the TrackingMore get endpoint.
    pub async fn trackingmore(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/trackings/get"))
            .and(header("Tracking-Api-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts the UPS token endpoint.
    pub async fn ups_token(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/security/v1/oauth/token"))
            .and(header("x-merchant-id", UPS_ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts the UPS details endpoint for `tracking_id`.
    pub async fn ups_details(&self, tracking_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/track/v1/details/{tracking_id}")))
            .and(header("authorization", format!("Bearer {UPS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts the 17Track gettrackinfo endpoint.
    pub async fn track17(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/gettrackinfo"))
            .and(header("17token", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answers every request with `status`.
    pub async fn fail_all(&self, status: u16) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answers every request after `delay`.
    pub async fn delay_all(&self, delay: Duration) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Fails the test on drop if any request reaches this mock.
    pub async fn expect_no_calls(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far.
    pub async fn received_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }
}
