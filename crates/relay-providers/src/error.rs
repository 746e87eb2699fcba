//! Error types for single provider calls.
//!
//! Every failure an adapter can observe maps to one `ProviderError` variant.
//! Whether that failure stops the fallback chain is decided separately by
//! wrapping it in `AttemptOutcome::Recoverable` or `AttemptOutcome::Fatal`.

use relay_core::ProviderKind;
use thiserror::Error;

/// Result type alias for provider calls.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure of one provider network call or payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Call exceeded the client timeout.
    #[error("upstream timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// Connection-level failure.
    #[error("network error: {message}")]
    Network {
        /// Error message describing the failure
        message: String,
    },

    /// Provider answered with a non-success HTTP status.
    #[error("upstream returned HTTP {status_code}")]
    UpstreamStatus {
        /// HTTP status code returned by the provider
        status_code: u16,
        /// Truncated response body
        body: String,
    },

    /// Success status but a body that cannot be decoded.
    #[error("invalid upstream payload")]
    InvalidPayload {
        /// What was wrong with the payload
        message: String,
    },

    /// Payload decoded but carried no shipment for the tracking id.
    #[error("no tracking data returned")]
    NoData,

    /// Provider quota or subscription limit reached.
    #[error("provider quota exhausted: {code}")]
    QuotaExhausted {
        /// Provider error code
        code: String,
    },

    /// Two-phase provider returned no correlation id.
    #[error("no correlation id in provider response")]
    MissingCorrelationId,

    /// Provider refused the configured credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Provider refused the tracking id.
    #[error("invalid tracking id")]
    InvalidTrackingId,

    /// Provider declared an error this relay does not know.
    #[error("{message}")]
    Rejected {
        /// Raw provider error message
        message: String,
    },

    /// Credential exchange failed.
    #[error("credential exchange failed: {message}")]
    Authentication {
        /// Error message from the exchange
        message: String,
    },

    /// HTTP client could not be configured.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl ProviderError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates an upstream status error.
    pub fn upstream_status(status_code: u16, body: impl Into<String>) -> Self {
        Self::UpstreamStatus { status_code, body: body.into() }
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload { message: message.into() }
    }

    /// Creates a rejection carrying the provider's own message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// HTTP status to surface when this error ends a lookup.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Timeout { .. } => 504,
            Self::UpstreamStatus { status_code, .. } => match *status_code {
                code @ 400..=599 => code,
                _ => 502,
            },
            Self::InvalidPayload { .. } | Self::Configuration { .. } => 500,
            Self::InvalidCredentials | Self::InvalidTrackingId | Self::Rejected { .. } => 400,
            Self::Network { .. }
            | Self::NoData
            | Self::QuotaExhausted { .. }
            | Self::MissingCorrelationId
            | Self::Authentication { .. } => 502,
        }
    }

    /// Returns true for failures of the transport or the provider's HTTP
    /// layer, as opposed to a payload the provider returned on purpose.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. } | Self::UpstreamStatus { .. })
    }

    /// Returns true for recoverable failures that should be reported as the
    /// provider's own failure when nothing else may be tried.
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::UpstreamStatus { .. } | Self::Authentication { .. }
        )
    }

    /// Returns an actionable hint for the caller.
    pub fn hint(&self, provider: ProviderKind) -> Option<String> {
        match self {
            Self::InvalidCredentials | Self::Authentication { .. } => {
                Some(format!("Check {}", provider.credential_env_vars().join("/")))
            },
            Self::QuotaExhausted { .. } => Some(format!(
                "{} quota exhausted; configure another provider or use TRACKING_PROVIDER=auto",
                provider.display_name()
            )),
            _ => None,
        }
    }
}

/// Category of provider error for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Timeouts and connection failures.
    Network,
    /// Non-success HTTP responses.
    Upstream,
    /// Payload-level problems.
    Payload,
    /// Credential or quota problems.
    Account,
    /// Caller input refused by the provider.
    Input,
    /// Local configuration problems.
    Configuration,
}

impl From<&ProviderError> for ErrorCategory {
    fn from(error: &ProviderError) -> Self {
        match error {
            ProviderError::Timeout { .. } | ProviderError::Network { .. } => Self::Network,
            ProviderError::UpstreamStatus { .. } => Self::Upstream,
            ProviderError::InvalidPayload { .. }
            | ProviderError::NoData
            | ProviderError::MissingCorrelationId => Self::Payload,
            ProviderError::QuotaExhausted { .. }
            | ProviderError::InvalidCredentials
            | ProviderError::Authentication { .. } => Self::Account,
            ProviderError::InvalidTrackingId | ProviderError::Rejected { .. } => Self::Input,
            ProviderError::Configuration { .. } => Self::Configuration,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Upstream => write!(f, "upstream"),
            Self::Payload => write!(f, "payload"),
            Self::Account => write!(f, "account"),
            Self::Input => write!(f, "input"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}
