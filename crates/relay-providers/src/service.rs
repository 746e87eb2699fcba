//! Tracking service used by the HTTP layer.

use std::sync::Arc;

use relay_core::{ProviderConfig, RelayError, ShipmentResult, TrackingRequest};
use tracing::{debug, instrument};

use crate::{client::ProviderClient, orchestrator::FallbackOrchestrator, selector::select_order};

/// Selects providers for a request and resolves the lookup.
///
/// Cheap to clone; the provider configuration and adapters are shared.
#[derive(Debug, Clone)]
pub struct TrackingService {
    configs: Arc<[ProviderConfig]>,
    orchestrator: FallbackOrchestrator,
}

impl TrackingService {
    /// Creates a service with adapters for every credentialed provider.
    pub fn new(configs: impl Into<Arc<[ProviderConfig]>>, client: ProviderClient) -> Self {
        let configs = configs.into();
        let orchestrator = FallbackOrchestrator::new(&configs, &client);
        Self { configs, orchestrator }
    }

    /// Creates a service around an existing orchestrator.
    pub fn with_orchestrator(
        configs: impl Into<Arc<[ProviderConfig]>>,
        orchestrator: FallbackOrchestrator,
    ) -> Self {
        Self { configs: configs.into(), orchestrator }
    }

    /// Immutable provider configuration.
    pub fn configs(&self) -> &[ProviderConfig] {
        &self.configs
    }

    /// Looks up one tracking id.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any network call when no
    /// suitable provider is configured, otherwise whatever the fallback chain
    /// resolves to.
    #[instrument(
        name = "track",
        skip(self, request),
        fields(tracking_id = %request.tracking_id, requested = %request.requested_provider)
    )]
    pub async fn track(&self, request: &TrackingRequest) -> Result<ShipmentResult, RelayError> {
        let selection = select_order(&self.configs, request.requested_provider)?;

        debug!(
            mode = ?selection.mode,
            order = ?selection.order.iter().map(|config| config.kind.as_str()).collect::<Vec<_>>(),
            "Provider order selected"
        );

        self.orchestrator.resolve(request, &selection).await
    }
}
