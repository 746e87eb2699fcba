//! Result of one provider attempt.

use relay_core::ShipmentResult;

use crate::error::ProviderError;

/// Outcome of a single provider attempt.
///
/// Drives the orchestrator's continue/stop decision and is never exposed to
/// callers directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Provider produced a normalized shipment.
    Success(ShipmentResult),
    /// Provider could not be used; another provider may succeed.
    Recoverable(ProviderError),
    /// Provider failed in a way that should be reported.
    Fatal(ProviderError),
}

impl AttemptOutcome {
    /// Returns the error for failed outcomes.
    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            Self::Success(_) => None,
            Self::Recoverable(error) | Self::Fatal(error) => Some(error),
        }
    }

    /// Short label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Recoverable(_) => "recoverable",
            Self::Fatal(_) => "fatal",
        }
    }
}

impl From<ProviderError> for AttemptOutcome {
    /// Transport-level failures default to recoverable, everything else to
    /// fatal. Adapters override this where a provider needs it.
    fn from(error: ProviderError) -> Self {
        if error.is_transport() {
            Self::Recoverable(error)
        } else {
            Self::Fatal(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_default_to_recoverable() {
        let outcome = AttemptOutcome::from(ProviderError::network("refused"));
        assert!(matches!(outcome, AttemptOutcome::Recoverable(_)));
        assert_eq!(outcome.label(), "recoverable");

        let outcome = AttemptOutcome::from(ProviderError::InvalidTrackingId);
        assert!(matches!(outcome, AttemptOutcome::Fatal(_)));
        assert_eq!(outcome.error(), Some(&ProviderError::InvalidTrackingId));
    }
}
