//! End-to-end relay scenarios.
//!
//! Each test builds the full router from a `Config` whose provider base URLs
//! point at mock provider servers, then drives it with `oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use relay_api::{create_router, AppState, Config};
use relay_core::ProviderKind;
use relay_testing::{
    fixtures,
    http::{API_KEY, UPS_ACCESS_KEY},
    ProviderMock,
};
use serde_json::Value;
use tower::ServiceExt;

async fn track(config: Config, tracking: &str) -> (StatusCode, Value) {
    let app = create_router(AppState::from_config(config).expect("failed to build app state"));
    let request = Request::builder()
        .uri(format!("/api/track?tracking={tracking}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.expect("failed to make request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");

    (status, serde_json::from_slice(&bytes).expect("response body should be valid JSON"))
}

/// Only UPS credentials are set: the relay authenticates, looks up the
/// package and reports UPS as the provider.
#[tokio::test]
async fn ups_only_deployment() {
    let ups = ProviderMock::start(ProviderKind::Ups).await;
    ups.respond_with_shipment("1Z999AA10123456784").await;

    let config = Config {
        ups_access_key: Some(UPS_ACCESS_KEY.to_string()),
        ups_user_id: Some("test-client".to_string()),
        ups_password: Some("test-secret".to_string()),
        ups_api_base: ups.url(),
        ..Config::default()
    };

    let (status, body) = track(config, "1Z999AA10123456784").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["provider"], "ups");
    assert_eq!(body["carrier"]["slug"], "ups");
    assert_eq!(body["events"][0]["timestamp"], "2024-03-05T14:30:00");
}

/// ParcelsApp reports its subscription limit on create; the relay falls
/// through to 17Track.
#[tokio::test]
async fn parcels_quota_falls_through_to_17track() {
    let parcels = ProviderMock::start(ProviderKind::ParcelsApp).await;
    parcels.parcels_create(fixtures::parcels_error("SUBSCRIPTION_LIMIT_REACHED")).await;
    let track17 = ProviderMock::start(ProviderKind::Track17).await;
    track17.respond_with_shipment("ABC123").await;

    let config = Config {
        parcels_api_token: Some(API_KEY.to_string()),
        parcels_api_base: parcels.url(),
        track17_api_key: Some(API_KEY.to_string()),
        track17_api_base: track17.url(),
        ..Config::default()
    };

    let (status, body) = track(config, "ABC123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["provider"], "17track");
    assert_eq!(body["trackingId"], "ABC123");
    assert_eq!(parcels.received_count().await, 1);
}

/// Nothing configured at all: fail fast with a configuration error.
#[tokio::test]
async fn no_environment_at_all() {
    let (status, body) = track(Config::default(), "ABC123").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No API keys configured");
    assert!(body["hint"].is_string());
}
