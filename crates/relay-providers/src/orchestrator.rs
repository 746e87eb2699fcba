//! Sequential fallback across selected providers.
//!
//! The orchestrator attempts providers strictly in selection order. The first
//! success wins; results are never merged and an exhausted chain never yields
//! a partial result.

use std::{collections::HashMap, sync::Arc};

use relay_core::{ProviderConfig, ProviderKind, RelayError, ShipmentResult, TrackingRequest};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    adapters::{self, TrackingProvider},
    client::ProviderClient,
    error::{ErrorCategory, ProviderError},
    outcome::AttemptOutcome,
    selector::Selection,
};

/// Walks a `Selection` and resolves it into one shipment or one error.
#[derive(Clone)]
pub struct FallbackOrchestrator {
    providers: HashMap<ProviderKind, Arc<dyn TrackingProvider>>,
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("FallbackOrchestrator").field("providers", &kinds).finish()
    }
}

impl FallbackOrchestrator {
    /// Builds adapters for every credentialed configuration.
    pub fn new(configs: &[ProviderConfig], client: &ProviderClient) -> Self {
        Self::from_providers(configs.iter().filter_map(|config| adapters::build(config, client)))
    }

    /// Uses the given adapters, keyed by their kind.
    pub fn from_providers(providers: impl IntoIterator<Item = Arc<dyn TrackingProvider>>) -> Self {
        let providers = providers.into_iter().map(|provider| (provider.kind(), provider)).collect();
        Self { providers }
    }

    /// Resolves a lookup against the selected providers.
    ///
    /// # Errors
    ///
    /// - `ProviderNotConfigured` when a selected provider has no adapter
    /// - `UpstreamTimeout` when the deciding provider timed out
    /// - `ProviderFailed` for a fatal failure that ends the chain
    /// - `ProviderUnavailable` when every candidate failed recoverably
    pub async fn resolve(
        &self,
        request: &TrackingRequest,
        selection: &Selection,
    ) -> Result<ShipmentResult, RelayError> {
        let total = selection.order.len();
        if total == 0 {
            return Err(RelayError::NoProviderConfigured);
        }

        let mut attempted = Vec::with_capacity(total);

        for (index, config) in selection.order.iter().enumerate() {
            let kind = config.kind;
            let is_last = index + 1 == total;
            let provider = self
                .providers
                .get(&kind)
                .ok_or(RelayError::ProviderNotConfigured { provider: kind })?;

            attempted.push(kind);

            let span = info_span!("provider_attempt", provider = %kind, attempt = index + 1, total);
            let outcome = provider.track(request).instrument(span).await;

            debug!(
                provider = %kind,
                outcome = outcome.label(),
                error = outcome.error().map(tracing::field::display),
                "Provider attempt finished"
            );

            match outcome {
                AttemptOutcome::Success(shipment) => {
                    info!(
                        provider = %kind,
                        events = shipment.events.len(),
                        done = shipment.done,
                        "Tracking lookup resolved"
                    );
                    return Ok(shipment);
                },
                AttemptOutcome::Recoverable(error) if !is_last => {
                    warn!(
                        provider = %kind,
                        category = %ErrorCategory::from(&error),
                        error = %error,
                        "Provider unavailable, trying next"
                    );
                },
                AttemptOutcome::Recoverable(error) => {
                    warn!(
                        provider = %kind,
                        category = %ErrorCategory::from(&error),
                        error = %error,
                        "Last provider unavailable"
                    );
                    return Err(exhausted(kind, error, selection, attempted));
                },
                AttemptOutcome::Fatal(error) if selection.is_explicit() || is_last => {
                    warn!(
                        provider = %kind,
                        category = %ErrorCategory::from(&error),
                        error = %error,
                        "Provider failed"
                    );
                    return Err(failed(kind, &error));
                },
                AttemptOutcome::Fatal(error) => {
                    warn!(
                        provider = %kind,
                        category = %ErrorCategory::from(&error),
                        error = %error,
                        "Provider failed, trying next"
                    );
                },
            }
        }

        Err(RelayError::ProviderUnavailable {
            attempted,
            last_error: "no provider produced a result".to_string(),
        })
    }
}

/// Error for a recoverable failure of the last candidate.
fn exhausted(
    kind: ProviderKind,
    error: ProviderError,
    selection: &Selection,
    attempted: Vec<ProviderKind>,
) -> RelayError {
    match error {
        ProviderError::Timeout { .. } => RelayError::UpstreamTimeout { provider: kind },
        error if selection.is_explicit() && error.is_reportable() => failed(kind, &error),
        error => RelayError::ProviderUnavailable { attempted, last_error: error.to_string() },
    }
}

/// Error for a failure that is reported as the provider's own.
fn failed(kind: ProviderKind, error: &ProviderError) -> RelayError {
    match error {
        ProviderError::Timeout { .. } => RelayError::UpstreamTimeout { provider: kind },
        error => RelayError::ProviderFailed {
            provider: kind,
            status: error.status_code(),
            message: error.to_string(),
            hint: error.hint(kind),
        },
    }
}
