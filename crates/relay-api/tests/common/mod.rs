//! Router test helpers shared by the relay-api integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use relay_api::{create_router, AppState, Config};
use relay_core::{Clock, ManualClock, ProviderKind};
use relay_testing::{
    http::{API_KEY, UPS_ACCESS_KEY},
    ProviderMock,
};
use serde_json::Value;
use tower::ServiceExt;

/// Seconds after the epoch the test clock starts at (2023-11-14T22:13:20Z).
pub const CLOCK_START: u64 = 1_700_000_000;

/// Configuration with credentials for each mock and none for anyone else.
pub fn config_for(mocks: &[&ProviderMock]) -> Config {
    let mut config = Config::default();
    for mock in mocks {
        let key = Some(API_KEY.to_string());
        match mock.kind() {
            ProviderKind::ParcelsApp => {
                config.parcels_api_token = key;
                config.parcels_api_base = mock.url();
            },
            ProviderKind::TrackingMore => {
                config.trackingmore_api_key = key;
                config.trackingmore_api_base = mock.url();
            },
            ProviderKind::Ups => {
                config.ups_access_key = Some(UPS_ACCESS_KEY.to_string());
                config.ups_user_id = Some("test-client".to_string());
                config.ups_password = Some("test-secret".to_string());
                config.ups_api_base = mock.url();
            },
            ProviderKind::Track17 => {
                config.track17_api_key = key;
                config.track17_api_base = mock.url();
            },
        }
    }
    config
}

/// Router over `config` with a pinned clock.
pub fn router(config: Config) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::from_unix_seconds(CLOCK_START));
    let state = AppState::with_clock(config, clock).expect("failed to build app state");
    create_router(state)
}

/// Response parts with the body decoded as JSON (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Sends one request through the router.
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("failed to make request");
    let status = response.status();
    let headers = response.headers().clone();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be valid JSON")
    };

    TestResponse { status, headers, body }
}

/// Sends a `GET` to `uri`.
pub async fn get(app: Router, uri: &str) -> TestResponse {
    let request = Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
