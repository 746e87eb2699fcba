//! Test infrastructure for the parcel tracking relay.
//!
//! Provides mock provider servers speaking each provider's wire format and
//! canned provider payloads, so adapter, service and router tests never
//! touch a real tracking API.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
pub mod http;

pub use http::ProviderMock;
use relay_core::{Credentials, ProviderConfig, ProviderKind};

/// Placeholder credentials accepted by every `ProviderMock`.
pub fn test_credentials(kind: ProviderKind) -> Credentials {
    match kind {
        ProviderKind::Ups => Credentials::Ups {
            access_key: http::UPS_ACCESS_KEY.to_string(),
            user_id: "test-client".to_string(),
            password: "test-secret".to_string(),
        },
        ProviderKind::ParcelsApp | ProviderKind::TrackingMore | ProviderKind::Track17 => {
            Credentials::ApiKey(http::API_KEY.to_string())
        },
    }
}

/// Credentialed configuration pointing `kind` at `base_url`.
pub fn provider_config(kind: ProviderKind, base_url: &str) -> ProviderConfig {
    ProviderConfig::new(kind, base_url, Some(test_credentials(kind)))
}

/// Configuration for every provider with no credentials at all.
pub fn unconfigured_providers() -> Vec<ProviderConfig> {
    ProviderKind::ALL
        .iter()
        .map(|kind| ProviderConfig::new(*kind, "http://127.0.0.1:1", None))
        .collect()
}
