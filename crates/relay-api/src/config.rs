//! Configuration management for the parcel tracking relay.

use std::{collections::BTreeMap, fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use relay_core::{Credentials, ProviderConfig, ProviderKind, RequestedProvider};
use relay_providers::ClientConfig;
use serde::{Deserialize, Deserializer, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Environment variables holding provider secrets. They are read verbatim:
/// the generic environment layer would type `0012345` as the number `12345`.
const SECRET_VARS: [&str; 6] = [
    "PARCELS_API_TOKEN",
    "TRACKINGMORE_API_KEY",
    "UPS_ACCESS_KEY",
    "UPS_USER_ID",
    "UPS_PASSWORD",
    "TRACK17_API_KEY",
];

/// Default ParcelsApp API base URL.
pub const DEFAULT_PARCELS_API_BASE: &str = "https://parcelsapp.com/api/v3";
/// Default TrackingMore API base URL.
pub const DEFAULT_TRACKINGMORE_API_BASE: &str = "https://api.trackingmore.com/v4";
/// Default UPS API base URL.
pub const DEFAULT_UPS_API_BASE: &str = "https://onlinetools.ups.com";
/// Default 17Track API base URL.
pub const DEFAULT_TRACK17_API_BASE: &str = "https://api.17track.net/track/v2.2";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`, never committed since it may hold
///    provider secrets)
/// 3. Built-in defaults (lowest priority)
///
/// Provider credentials are optional; a provider without credentials is
/// simply never selected.
///
/// # Example
///
/// ```no_run
/// use relay_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // ParcelsApp
    /// ParcelsApp API token.
    ///
    /// Environment variable: `PARCELS_API_TOKEN`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub parcels_api_token: Option<String>,
    /// ParcelsApp API base URL.
    ///
    /// Environment variable: `PARCELS_API_BASE`
    #[serde(default = "default_parcels_api_base")]
    pub parcels_api_base: String,

    // TrackingMore
    /// TrackingMore API key.
    ///
    /// Environment variable: `TRACKINGMORE_API_KEY`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub trackingmore_api_key: Option<String>,
    /// TrackingMore API base URL.
    ///
    /// Environment variable: `TRACKINGMORE_API_BASE`
    #[serde(default = "default_trackingmore_api_base")]
    pub trackingmore_api_base: String,

    // UPS
    /// UPS access license number.
    ///
    /// Environment variable: `UPS_ACCESS_KEY`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub ups_access_key: Option<String>,
    /// UPS OAuth client id.
    ///
    /// Environment variable: `UPS_USER_ID`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub ups_user_id: Option<String>,
    /// UPS OAuth client secret.
    ///
    /// Environment variable: `UPS_PASSWORD`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub ups_password: Option<String>,
    /// UPS API base URL.
    ///
    /// Environment variable: `UPS_API_BASE`
    #[serde(default = "default_ups_api_base")]
    pub ups_api_base: String,

    // 17Track
    /// 17Track API token.
    ///
    /// Environment variable: `TRACK17_API_KEY`
    #[serde(default, deserialize_with = "secret", skip_serializing_if = "Option::is_none")]
    pub track17_api_key: Option<String>,
    /// 17Track API base URL.
    ///
    /// Environment variable: `TRACK17_API_BASE`
    #[serde(default = "default_track17_api_base")]
    pub track17_api_base: String,

    // Behavior
    /// Provider selection: `auto` or a provider name.
    ///
    /// Environment variable: `TRACKING_PROVIDER`
    #[serde(default = "default_tracking_provider")]
    pub tracking_provider: String,
    /// Serve canned data instead of calling providers (ignored in
    /// production).
    ///
    /// Environment variable: `USE_MOCK_DATA`
    #[serde(default)]
    pub use_mock_data: bool,
    /// Deployment environment name.
    ///
    /// Environment variable: `APP_ENV`
    #[serde(default = "default_app_env")]
    pub app_env: String,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// Aggregate request deadline in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Per provider call timeout in seconds.
    ///
    /// Environment variable: `PROVIDER_TIMEOUT_SECONDS`
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_seconds: u64,

    // Logging
    /// Log filter directives.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed("").ignore(&SECRET_VARS))
                .merge(Serialized::defaults(secret_env())),
        )
    }

    /// Extracts and validates configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Returns true when running in production.
    pub fn is_production(&self) -> bool {
        self.app_env.trim().eq_ignore_ascii_case("production")
    }

    /// Returns true when canned data should be served.
    ///
    /// Mock data is never served in production, whatever `USE_MOCK_DATA`
    /// says.
    pub fn mock_mode(&self) -> bool {
        self.use_mock_data && !self.is_production()
    }

    /// Parses the configured provider selection.
    pub fn requested_provider(&self) -> Result<RequestedProvider> {
        RequestedProvider::from_str(&self.tracking_provider)
            .with_context(|| format!("Invalid TRACKING_PROVIDER '{}'", self.tracking_provider))
    }

    /// Builds the immutable per-provider configuration, one entry per
    /// supported provider.
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        let api_key = |key: &Option<String>| key.clone().map(Credentials::ApiKey);

        let ups = match (&self.ups_access_key, &self.ups_user_id, &self.ups_password) {
            (None, None, None) => None,
            (access_key, user_id, password) => Some(Credentials::Ups {
                access_key: access_key.clone().unwrap_or_default(),
                user_id: user_id.clone().unwrap_or_default(),
                password: password.clone().unwrap_or_default(),
            }),
        };

        vec![
            ProviderConfig::new(
                ProviderKind::ParcelsApp,
                &self.parcels_api_base,
                api_key(&self.parcels_api_token),
            ),
            ProviderConfig::new(
                ProviderKind::TrackingMore,
                &self.trackingmore_api_base,
                api_key(&self.trackingmore_api_key),
            ),
            ProviderConfig::new(ProviderKind::Ups, &self.ups_api_base, ups),
            ProviderConfig::new(
                ProviderKind::Track17,
                &self.track17_api_base,
                api_key(&self.track17_api_key),
            ),
        ]
    }

    /// Convert to provider client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.provider_timeout_seconds),
            ..ClientConfig::default()
        }
    }

    /// Aggregate request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.provider_timeout_seconds == 0 {
            anyhow::bail!("provider_timeout_seconds must be greater than 0");
        }

        self.requested_provider()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parcels_api_token: None,
            parcels_api_base: default_parcels_api_base(),
            trackingmore_api_key: None,
            trackingmore_api_base: default_trackingmore_api_base(),
            ups_access_key: None,
            ups_user_id: None,
            ups_password: None,
            ups_api_base: default_ups_api_base(),
            track17_api_key: None,
            track17_api_base: default_track17_api_base(),
            tracking_provider: default_tracking_provider(),
            use_mock_data: false,
            app_env: default_app_env(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            provider_timeout_seconds: default_provider_timeout(),
            rust_log: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |secret: &Option<String>| secret.as_ref().map(|_| "***");

        f.debug_struct("Config")
            .field("parcels_api_token", &set(&self.parcels_api_token))
            .field("parcels_api_base", &self.parcels_api_base)
            .field("trackingmore_api_key", &set(&self.trackingmore_api_key))
            .field("trackingmore_api_base", &self.trackingmore_api_base)
            .field("ups_access_key", &set(&self.ups_access_key))
            .field("ups_user_id", &set(&self.ups_user_id))
            .field("ups_password", &set(&self.ups_password))
            .field("ups_api_base", &self.ups_api_base)
            .field("track17_api_key", &set(&self.track17_api_key))
            .field("track17_api_base", &self.track17_api_base)
            .field("tracking_provider", &self.tracking_provider)
            .field("use_mock_data", &self.use_mock_data)
            .field("app_env", &self.app_env)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("provider_timeout_seconds", &self.provider_timeout_seconds)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Secret variables present in the environment, keyed like `Config` fields.
fn secret_env() -> BTreeMap<String, String> {
    SECRET_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok().map(|value| (var.to_ascii_lowercase(), value)))
        .collect()
}

/// Reads a secret that `config.toml` may hold as a bare number or boolean.
fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(value)) => Some(value),
        Some(other) => Some(other.to_string()),
    })
}

fn default_parcels_api_base() -> String {
    DEFAULT_PARCELS_API_BASE.to_string()
}

fn default_trackingmore_api_base() -> String {
    DEFAULT_TRACKINGMORE_API_BASE.to_string()
}

fn default_ups_api_base() -> String {
    DEFAULT_UPS_API_BASE.to_string()
}

fn default_track17_api_base() -> String {
    DEFAULT_TRACK17_API_BASE.to_string()
}

fn default_tracking_provider() -> String {
    "auto".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    180
}

fn default_provider_timeout() -> u64 {
    relay_providers::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info,parcel_relay=debug,relay_api=debug,relay_providers=debug,tower_http=debug".to_string()
}
