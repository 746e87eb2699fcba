//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::{Clock, ProviderConfig, SystemClock};
use relay_providers::{ProviderClient, TrackingService};

use crate::config::Config;

/// State shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded service configuration.
    pub config: Arc<Config>,
    /// Immutable per-provider configuration.
    pub configs: Arc<[ProviderConfig]>,
    /// Provider selection and fallback.
    pub service: TrackingService,
    /// Pooled provider client, also used for diagnostics probes.
    pub client: ProviderClient,
    /// Time source for timestamps and probe timings.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Builds state from configuration with the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds state from configuration with the given clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider HTTP client cannot be built.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = ProviderClient::new(config.to_client_config())
            .context("Failed to build provider HTTP client")?;
        let configs: Arc<[ProviderConfig]> = config.provider_configs().into();
        let service = TrackingService::new(configs.clone(), client.clone());

        Ok(Self { config: Arc::new(config), configs, service, client, clock })
    }
}
