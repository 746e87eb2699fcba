//! HTTP client for provider calls with a bounded per-call timeout.
//!
//! Handles request execution, timeout and connection error categorization,
//! and the shared decode-or-passthrough body helper every adapter uses.

use std::time::{Duration, Instant};

use relay_core::ProviderKind;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::error::{ProviderError, Result};

/// Bodies longer than this are truncated when kept as text.
const MAX_TEXT_BODY_SIZE: usize = 64 * 1024;

/// Configuration for the provider client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout applied to every provider call.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("parcel-relay/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 3,
        }
    }
}

/// Decoded provider response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that is not JSON, kept verbatim (truncated).
    Text(String),
    /// Empty body.
    Empty,
}

impl ResponseBody {
    /// Decodes raw bytes: JSON when it parses, otherwise the raw text.
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(truncate(bytes)),
        }
    }

    /// Returns the JSON value, if the body parsed.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) | Self::Empty => None,
        }
    }

    /// Consumes the body, returning the JSON value or an invalid payload error.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => Err(ProviderError::invalid_payload(format!(
                "expected JSON, got: {}",
                text.chars().take(120).collect::<String>()
            ))),
            Self::Empty => Err(ProviderError::invalid_payload("empty body")),
        }
    }

    /// Short textual form for error messages and logs.
    pub fn preview(&self) -> String {
        let full = match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
            Self::Empty => String::new(),
        };
        full.chars().take(512).collect()
    }
}

fn truncate(bytes: &[u8]) -> String {
    if bytes.len() > MAX_TEXT_BODY_SIZE {
        let truncated = String::from_utf8_lossy(&bytes[..MAX_TEXT_BODY_SIZE]);
        format!("{truncated}... (truncated)")
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Response from a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Decoded body.
    pub body: ResponseBody,
    /// Whether the status was 2xx.
    pub is_success: bool,
}

impl ProviderResponse {
    /// Converts a non-2xx response into an `UpstreamStatus` error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success {
            Ok(self)
        } else {
            Err(ProviderError::upstream_status(self.status_code, self.body.preview()))
        }
    }
}

/// Pooled HTTP client shared by every provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ProviderClient {
    /// Creates a new provider client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new provider client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Underlying `reqwest` client for building requests.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sends a request and decodes the body.
    ///
    /// Non-2xx responses are returned as responses, not errors; callers
    /// decide how a status maps to an outcome.
    ///
    /// # Errors
    ///
    /// - `Timeout` when the call exceeds the client timeout
    /// - `Network` for connection and other transport failures
    pub async fn send(
        &self,
        provider: ProviderKind,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<ProviderResponse> {
        let span = info_span!("provider_call", provider = %provider, operation);

        async move {
            let start_time = Instant::now();
            tracing::debug!("Sending provider request");

            let response = request.send().await.map_err(|e| self.map_error(&e, start_time))?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| self.map_error(&e, start_time))?;
            let duration = start_time.elapsed();

            tracing::debug!(
                status = status.as_u16(),
                duration_ms = duration.as_millis(),
                "Received provider response"
            );

            Ok(ProviderResponse {
                status_code: status.as_u16(),
                body: ResponseBody::decode(&bytes),
                is_success: status.is_success(),
            })
        }
        .instrument(span)
        .await
    }

    /// Checks whether a URL answers at all.
    ///
    /// Any HTTP response, including 4xx and 5xx, counts as reachable. Used by
    /// diagnostics only; never performs a tracking lookup.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` or `Network` when no response arrives.
    pub async fn probe(&self, provider: ProviderKind, url: &str) -> Result<ProviderResponse> {
        self.send(provider, "probe", self.client.get(url)).await
    }

    fn map_error(&self, error: &reqwest::Error, start_time: Instant) -> ProviderError {
        tracing::warn!(duration_ms = start_time.elapsed().as_millis(), "Request failed: {}", error);

        if error.is_timeout() {
            return ProviderError::Timeout {
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return ProviderError::network(format!("connection failed: {error}"));
        }
        ProviderError::network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn decode_prefers_json() {
        assert_eq!(
            ResponseBody::decode(br#"{"ok":true}"#),
            ResponseBody::Json(json!({"ok": true}))
        );
        assert_eq!(
            ResponseBody::decode(b"<html>oops</html>"),
            ResponseBody::Text("<html>oops</html>".into())
        );
        assert_eq!(ResponseBody::decode(b"  \n"), ResponseBody::Empty);
    }

    #[test]
    fn into_json_rejects_text() {
        let err = ResponseBody::Text("Bad Gateway".into()).into_json().unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPayload { .. }));
        assert!(ResponseBody::Empty.into_json().is_err());
    }

    #[test]
    fn oversized_text_truncated() {
        let body = vec![b'a'; MAX_TEXT_BODY_SIZE + 10];
        match ResponseBody::decode(&body) {
            ResponseBody::Text(text) => assert!(text.ends_with("... (truncated)")),
            other => panic!("expected text body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let client = ProviderClient::with_defaults().unwrap();
        let response = client
            .send(ProviderKind::Ups, "test", client.http().get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status_code, 503);
        assert!(!response.is_success);
        assert_eq!(response.body, ResponseBody::Text("busy".into()));

        let err = response.error_for_status().unwrap_err();
        assert_eq!(err, ProviderError::upstream_status(503, "busy"));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ClientConfig { timeout: Duration::from_millis(50), ..Default::default() };
        let client = ProviderClient::new(config).unwrap();
        let err = client
            .send(ProviderKind::Track17, "test", client.http().get(server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::Timeout { timeout_ms: 50 });
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let client = ProviderClient::with_defaults().unwrap();
        let err = client.probe(ProviderKind::Ups, "http://127.0.0.1:1/").await.unwrap_err();

        assert!(matches!(err, ProviderError::Network { .. }));
    }
}
