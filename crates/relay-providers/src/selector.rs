//! Provider selection.
//!
//! Turns the immutable provider configuration plus the requested mode into
//! the ordered list of providers a lookup will attempt.

use relay_core::{ProviderConfig, RelayError, RequestedProvider};

/// How the order was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every credentialed provider, in priority order.
    Auto,
    /// One provider named by the caller or configuration.
    Explicit,
}

/// Ordered providers to attempt for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selection mode.
    pub mode: SelectionMode,
    /// Providers in attempt order, never empty.
    pub order: Vec<ProviderConfig>,
}

impl Selection {
    /// Returns true when the provider was explicitly requested.
    pub fn is_explicit(&self) -> bool {
        self.mode == SelectionMode::Explicit
    }
}

/// Computes the attempt order.
///
/// # Errors
///
/// - `ProviderNotConfigured` when an explicitly requested provider has no
///   credentials; no other provider is substituted
/// - `NoProviderConfigured` when no provider has credentials
pub fn select_order(
    configs: &[ProviderConfig],
    requested: RequestedProvider,
) -> Result<Selection, RelayError> {
    match requested {
        RequestedProvider::Explicit(kind) => {
            let config = configs
                .iter()
                .find(|config| config.kind == kind && config.credentials_present())
                .ok_or(RelayError::ProviderNotConfigured { provider: kind })?;

            Ok(Selection { mode: SelectionMode::Explicit, order: vec![config.clone()] })
        },
        RequestedProvider::Auto => {
            let mut order: Vec<ProviderConfig> =
                configs.iter().filter(|config| config.credentials_present()).cloned().collect();
            if order.is_empty() {
                return Err(RelayError::NoProviderConfigured);
            }
            order.sort_by_key(|config| (config.priority, config.kind));

            Ok(Selection { mode: SelectionMode::Auto, order })
        },
    }
}
