//! Parcel tracking relay.
//!
//! Main entry point for the relay server. Loads configuration, initializes
//! logging and serves tracking lookups until shutdown.

use anyhow::{Context, Result};
use relay_api::{AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(&config.rust_log)?;

    info!("Starting parcel tracking relay");
    info!(config = ?config, "Configuration loaded");

    let addr = config.parse_server_addr()?;
    let state = AppState::from_config(config)?;

    let configured: Vec<&str> = state
        .configs
        .iter()
        .filter(|provider| provider.credentials_present())
        .map(|provider| provider.kind.as_str())
        .collect();
    if configured.is_empty() && !state.config.mock_mode() {
        tracing::warn!("No provider credentials configured; lookups will fail until one is set");
    } else {
        info!(providers = ?configured, mock = state.config.mock_mode(), "Providers ready");
    }

    relay_api::start_server(state, addr).await.context("HTTP server failed")?;

    info!("Parcel tracking relay shutdown complete");
    Ok(())
}

/// Initializes tracing from `RUST_LOG` or the configured filter.
fn init_tracing(directives: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(directives).context("Invalid RUST_LOG filter")?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
