//! Provider adapters.
//!
//! Each adapter performs one provider's network calls through the shared
//! `ProviderClient` and maps that provider's field names onto the common
//! `ShipmentResult` shape. Adapters never generate timestamps of their own.

use std::{future::Future, pin::Pin, sync::Arc};

use relay_core::{Credentials, ProviderConfig, ProviderKind, ShipmentResult, TrackingRequest};

use crate::{client::ProviderClient, outcome::AttemptOutcome};

pub mod parcelsapp;
pub mod track17;
pub mod trackingmore;
pub mod ups;

pub use parcelsapp::ParcelsAppProvider;
pub use track17::Track17Provider;
pub use trackingmore::TrackingMoreProvider;
pub use ups::UpsProvider;

/// One external tracking provider.
///
/// Implementations classify every failure themselves; the orchestrator only
/// sees the resulting `AttemptOutcome`.
pub trait TrackingProvider: Send + Sync + 'static {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Looks up one tracking id.
    fn track<'a>(
        &'a self,
        request: &'a TrackingRequest,
    ) -> Pin<Box<dyn Future<Output = AttemptOutcome> + Send + 'a>>;
}

/// Builds the adapter for a credentialed provider configuration.
///
/// Returns `None` when the configuration has no usable credentials.
pub fn build(
    config: &ProviderConfig,
    client: &ProviderClient,
) -> Option<Arc<dyn TrackingProvider>> {
    if !config.credentials_present() {
        return None;
    }

    let adapter: Arc<dyn TrackingProvider> = match (config.kind, config.credentials.as_ref()?) {
        (ProviderKind::ParcelsApp, Credentials::ApiKey(key)) => {
            Arc::new(ParcelsAppProvider::new(client.clone(), &config.base_url, key))
        },
        (ProviderKind::TrackingMore, Credentials::ApiKey(key)) => {
            Arc::new(TrackingMoreProvider::new(client.clone(), &config.base_url, key))
        },
        (ProviderKind::Track17, Credentials::ApiKey(key)) => {
            Arc::new(Track17Provider::new(client.clone(), &config.base_url, key))
        },
        (ProviderKind::Ups, Credentials::Ups { access_key, user_id, password }) => Arc::new(
            UpsProvider::new(client.clone(), &config.base_url, access_key, user_id, password),
        ),
        (kind, credentials) => {
            tracing::warn!(
                provider = %kind,
                ?credentials,
                "Credential shape does not match provider"
            );
            return None;
        },
    };

    Some(adapter)
}

/// Runs an adapter's fallible body, folding errors into the outcome.
pub(crate) fn settle(result: Result<ShipmentResult, AttemptOutcome>) -> AttemptOutcome {
    match result {
        Ok(shipment) => AttemptOutcome::Success(shipment),
        Err(outcome) => outcome,
    }
}
