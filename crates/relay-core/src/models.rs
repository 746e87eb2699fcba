//! Core domain models and strongly-typed identifiers.
//!
//! Defines the provider identifiers, the immutable per-provider
//! configuration, the inbound tracking request and the normalized shipment
//! shape every provider adapter produces.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Third-party tracking provider.
///
/// Declaration order is the static fallback priority used in `auto` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    /// ParcelsApp, two-phase create + poll API.
    #[serde(rename = "parcelsapp")]
    ParcelsApp,
    /// TrackingMore v4 API.
    #[serde(rename = "trackingmore")]
    TrackingMore,
    /// UPS Track API behind an OAuth credential exchange.
    #[serde(rename = "ups")]
    Ups,
    /// 17Track v2.2 API.
    #[serde(rename = "17track")]
    Track17,
}

impl ProviderKind {
    /// Every provider in static priority order.
    pub const ALL: [Self; 4] = [Self::ParcelsApp, Self::TrackingMore, Self::Ups, Self::Track17];

    /// Wire name used in query parameters, configuration and `_meta.provider`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParcelsApp => "parcelsapp",
            Self::TrackingMore => "trackingmore",
            Self::Ups => "ups",
            Self::Track17 => "17track",
        }
    }

    /// Human-readable provider name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ParcelsApp => "ParcelsApp",
            Self::TrackingMore => "TrackingMore",
            Self::Ups => "UPS",
            Self::Track17 => "17Track",
        }
    }

    /// Static fallback priority, lower is tried first.
    ///
    /// Reflects typical free-tier generosity. It is a fixed policy, not a
    /// score computed from provider behavior.
    pub const fn priority(self) -> u8 {
        match self {
            Self::ParcelsApp => 0,
            Self::TrackingMore => 1,
            Self::Ups => 2,
            Self::Track17 => 3,
        }
    }

    /// Environment variables that carry this provider's credentials.
    pub const fn credential_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::ParcelsApp => &["PARCELS_API_TOKEN"],
            Self::TrackingMore => &["TRACKINGMORE_API_KEY"],
            Self::Ups => &["UPS_ACCESS_KEY", "UPS_USER_ID", "UPS_PASSWORD"],
            Self::Track17 => &["TRACK17_API_KEY"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parcelsapp" | "parcels" => Ok(Self::ParcelsApp),
            "trackingmore" => Ok(Self::TrackingMore),
            "ups" => Ok(Self::Ups),
            "17track" | "track17" | "seventeentrack" => Ok(Self::Track17),
            _ => Err(RelayError::InvalidProvider { value: s.to_string() }),
        }
    }
}

/// Provider selection mode requested by the caller or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestedProvider {
    /// Try every credentialed provider in priority order.
    #[default]
    Auto,
    /// Use exactly this provider, without fallback.
    Explicit(ProviderKind),
}

impl fmt::Display for RequestedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for RequestedProvider {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        trimmed.parse().map(Self::Explicit)
    }
}

impl Serialize for RequestedProvider {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestedProvider {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Credentials for one provider.
///
/// `Debug` output masks every secret so configurations can be logged.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Single API key or token.
    ApiKey(String),
    /// UPS access key plus OAuth client id and secret.
    Ups {
        /// Access license number, sent as the merchant id.
        access_key: String,
        /// OAuth client id.
        user_id: String,
        /// OAuth client secret.
        password: String,
    },
}

impl Credentials {
    /// Returns true when every credential part is non-blank.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::ApiKey(key) => !key.trim().is_empty(),
            Self::Ups { access_key, user_id, password } => [access_key, user_id, password]
                .iter()
                .all(|part| !part.trim().is_empty()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(key) => f.debug_tuple("ApiKey").field(&mask(key)).finish(),
            Self::Ups { access_key, user_id, .. } => f
                .debug_struct("Ups")
                .field("access_key", &mask(access_key))
                .field("user_id", user_id)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Keeps the last four characters of a secret for correlation in logs.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

/// Immutable configuration for one provider.
///
/// Built once at startup from environment configuration and shared
/// read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Which provider this entry configures.
    pub kind: ProviderKind,
    /// Credentials, if any were configured.
    pub credentials: Option<Credentials>,
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Fallback priority, lower is tried first.
    pub priority: u8,
}

impl ProviderConfig {
    /// Creates a configuration using the provider's static priority.
    pub fn new(
        kind: ProviderKind,
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { kind, credentials, base_url, priority: kind.priority() }
    }

    /// Returns true when complete credentials are configured.
    pub fn credentials_present(&self) -> bool {
        self.credentials.as_ref().is_some_and(Credentials::is_complete)
    }
}

/// Inbound tracking lookup, scoped to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRequest {
    /// Trimmed, non-empty tracking code.
    pub tracking_id: String,
    /// Optional ISO country code of the destination.
    pub destination_country: Option<String>,
    /// Language for provider-generated descriptions.
    pub language: String,
    /// Provider selection mode.
    pub requested_provider: RequestedProvider,
}

impl TrackingRequest {
    /// Default language when the caller does not pick one.
    pub const DEFAULT_LANGUAGE: &'static str = "en";

    /// Creates a request in `auto` mode with the default language.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::MissingTrackingId` when the tracking id is empty
    /// or whitespace only.
    pub fn new(tracking_id: &str) -> Result<Self, RelayError> {
        let tracking_id = tracking_id.trim();
        if tracking_id.is_empty() {
            return Err(RelayError::MissingTrackingId);
        }

        Ok(Self {
            tracking_id: tracking_id.to_string(),
            destination_country: None,
            language: Self::DEFAULT_LANGUAGE.to_string(),
            requested_provider: RequestedProvider::Auto,
        })
    }

    /// Sets the destination country, ignoring blank values.
    #[must_use]
    pub fn with_destination_country(mut self, country: Option<&str>) -> Self {
        self.destination_country = non_blank(country);
        self
    }

    /// Sets the language, keeping the default for blank values.
    #[must_use]
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        if let Some(language) = non_blank(language) {
            self.language = language;
        }
        self
    }

    /// Sets the provider selection mode.
    #[must_use]
    pub fn with_requested_provider(mut self, requested: RequestedProvider) -> Self {
        self.requested_provider = requested;
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Carrier that physically handles the shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    /// Display name, e.g. `UPS`.
    pub name: String,
    /// Lowercase slug, e.g. `ups`.
    pub slug: String,
}

/// One scan or status event. Every field defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Provider event identifier.
    pub id: String,
    /// Short status label.
    pub status: String,
    /// Longer description.
    pub description: String,
    /// Provider-supplied timestamp, ISO-8601 where the provider allows.
    pub timestamp: String,
    /// Free-form location.
    pub location: String,
}

/// Normalized shipment returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResult {
    /// Tracking code the provider reported (or the requested one).
    pub tracking_id: String,
    /// Handling carrier.
    pub carrier: Carrier,
    /// Current shipment status.
    pub status: String,
    /// Origin, usually a country.
    pub origin: String,
    /// Destination, usually a country.
    pub destination: String,
    /// Events in the order the provider returned them.
    pub events: Vec<TrackingEvent>,
    /// `false` advises the caller to poll again later.
    pub done: bool,
    /// Whether the provider served the data from its own cache.
    pub from_cache: bool,
    /// Wire name of the provider that produced this result.
    pub provider: String,
}

impl ShipmentResult {
    /// Creates an empty, finished result for the given tracking id.
    pub fn new(tracking_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            carrier: Carrier::default(),
            status: String::new(),
            origin: String::new(),
            destination: String::new(),
            events: Vec::new(),
            done: true,
            from_cache: false,
            provider: provider.into(),
        }
    }
}
