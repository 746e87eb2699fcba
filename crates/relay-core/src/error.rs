//! Error types and result handling for tracking lookups.
//!
//! Defines the caller-facing error taxonomy with stable codes, HTTP status
//! mapping and actionable hints. Provider-level failures are resolved into
//! these variants by the fallback orchestrator; only the final outcome of a
//! lookup ever reaches this type.

use thiserror::Error;

use crate::models::ProviderKind;

/// Result type alias using `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types with codes for client disambiguation.
///
/// `Display` renders the human-readable message that goes into the `error`
/// field of response bodies.
#[derive(Debug, Error)]
pub enum RelayError {
    // Validation errors (E1001-E1003)
    /// Tracking id missing, empty or whitespace only (E1001).
    #[error("tracking query parameter required")]
    MissingTrackingId,

    /// Unknown provider name (E1002).
    #[error("unknown tracking provider '{value}'")]
    InvalidProvider {
        /// The value that failed to parse
        value: String,
    },

    /// Query string could not be decoded (E1003).
    #[error("invalid query string: {message}")]
    InvalidQuery {
        /// Decoder message
        message: String,
    },

    // Provider errors (E2001-E2003)
    /// Every candidate provider failed recoverably (E2001).
    #[error("No tracking provider available")]
    ProviderUnavailable {
        /// Providers attempted, in order
        attempted: Vec<ProviderKind>,
        /// Description of the last failure
        last_error: String,
    },

    /// The last candidate provider timed out (E2002).
    #[error("upstream timeout")]
    UpstreamTimeout {
        /// Provider that timed out
        provider: ProviderKind,
    },

    /// A provider failed terminally (E2003).
    #[error("{message}")]
    ProviderFailed {
        /// Provider that failed
        provider: ProviderKind,
        /// HTTP status to surface, upstream status when available
        status: u16,
        /// Failure description
        message: String,
        /// Optional remediation hint
        hint: Option<String>,
    },

    // Configuration errors (E3001-E3002)
    /// No provider has credentials (E3001).
    #[error("No API keys configured")]
    NoProviderConfigured,

    /// The explicitly requested provider has no credentials (E3002).
    #[error("provider not configured: {provider}")]
    ProviderNotConfigured {
        /// Requested provider
        provider: ProviderKind,
    },

    /// Unexpected internal failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RelayError {
    /// Returns the error code (E1001-E3002, E9999 for unexpected errors).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingTrackingId => "E1001",
            Self::InvalidProvider { .. } => "E1002",
            Self::InvalidQuery { .. } => "E1003",
            Self::ProviderUnavailable { .. } => "E2001",
            Self::UpstreamTimeout { .. } => "E2002",
            Self::ProviderFailed { .. } => "E2003",
            Self::NoProviderConfigured => "E3001",
            Self::ProviderNotConfigured { .. } => "E3002",
            Self::Other(_) => "E9999",
        }
    }

    /// Returns the HTTP status code this error maps to.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingTrackingId | Self::InvalidProvider { .. } | Self::InvalidQuery { .. } => {
                400
            },
            Self::ProviderUnavailable { .. } => 502,
            Self::UpstreamTimeout { .. } => 504,
            Self::ProviderFailed { status, .. } => *status,
            Self::NoProviderConfigured | Self::ProviderNotConfigured { .. } | Self::Other(_) => {
                500
            },
        }
    }

    /// Returns the provider the error is attributed to, if any.
    pub const fn provider(&self) -> Option<ProviderKind> {
        match self {
            Self::UpstreamTimeout { provider }
            | Self::ProviderFailed { provider, .. }
            | Self::ProviderNotConfigured { provider } => Some(*provider),
            _ => None,
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingTrackingId | Self::InvalidProvider { .. } | Self::InvalidQuery { .. }
        )
    }

    /// Returns an actionable hint, usually naming missing configuration.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoProviderConfigured => Some(format!(
                "Set at least one of {}",
                ProviderKind::ALL
                    .iter()
                    .map(|kind| kind.credential_env_vars().join("/"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::ProviderNotConfigured { provider } => Some(format!(
                "Set {} or use TRACKING_PROVIDER=auto",
                provider.credential_env_vars().join("/")
            )),
            Self::ProviderUnavailable { attempted, .. } => Some(format!(
                "All configured providers failed ({}); check provider quotas or configure \
                 another provider",
                attempted.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(", ")
            )),
            Self::UpstreamTimeout { provider } => {
                Some(format!("{} did not answer in time, try again later", provider.display_name()))
            },
            Self::InvalidProvider { .. } => Some(format!(
                "Use auto or one of {}",
                ProviderKind::ALL.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(", ")
            )),
            Self::ProviderFailed { hint, .. } => hint.clone(),
            Self::MissingTrackingId | Self::InvalidQuery { .. } | Self::Other(_) => None,
        }
    }
}
