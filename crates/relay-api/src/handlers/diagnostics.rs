//! Diagnostic report for `test=true`.
//!
//! Reports, per provider, whether credentials are present and whether its
//! base URL answers. Never performs a tracking lookup: reachability is a
//! plain `GET` against the configured base URL, and any HTTP response counts.

use axum::Json;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use relay_core::ProviderConfig;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::state::AppState;

/// Diagnostic report body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    /// Always `diagnostic`.
    pub mode: &'static str,
    /// Time the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Whether mock mode is active.
    pub mock_data: bool,
    /// Configured provider selection, as written in configuration.
    pub requested_provider: String,
    /// One entry per known provider, in priority order.
    pub providers: Vec<ProviderStatus>,
}

/// Configuration and reachability of one provider.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// Wire name.
    pub provider: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Whether credentials are present.
    pub configured: bool,
    /// Configured base URL.
    pub base_url: String,
    /// Whether the base URL answered, only probed when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    /// Probe duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Probe outcome or the reason no probe ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Builds the diagnostic report, probing credentialed providers concurrently.
#[instrument(name = "diagnostic_report", skip(state))]
pub async fn build_report(state: &AppState) -> Json<DiagnosticReport> {
    let providers = join_all(state.configs.iter().map(|config| provider_status(state, config)))
        .await;

    Json(DiagnosticReport {
        mode: "diagnostic",
        timestamp: DateTime::<Utc>::from(state.clock.now_system()),
        mock_data: state.config.mock_mode(),
        requested_provider: state.config.tracking_provider.clone(),
        providers,
    })
}

async fn provider_status(state: &AppState, config: &ProviderConfig) -> ProviderStatus {
    let mut status = ProviderStatus {
        provider: config.kind.as_str(),
        name: config.kind.display_name(),
        configured: config.credentials_present(),
        base_url: config.base_url.clone(),
        reachable: None,
        response_time_ms: None,
        message: None,
    };

    if !status.configured {
        status.message = Some(format!(
            "credentials not set ({})",
            config.kind.credential_env_vars().join(", ")
        ));
        return status;
    }

    let start_time = state.clock.now();
    let probe = state.client.probe(config.kind, &config.base_url).await;
    let elapsed = state.clock.now().saturating_duration_since(start_time);
    status.response_time_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));

    match probe {
        Ok(response) => {
            debug!(provider = %config.kind, status = response.status_code, "Provider reachable");
            status.reachable = Some(true);
            status.message = Some(format!("HTTP {}", response.status_code));
        },
        Err(e) => {
            warn!(provider = %config.kind, error = %e, "Provider unreachable");
            status.reachable = Some(false);
            status.message = Some(e.to_string());
        },
    }

    status
}
