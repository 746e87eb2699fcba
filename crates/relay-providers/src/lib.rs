//! Tracking provider adapters with ordered fallback.
//!
//! This crate turns a validated `TrackingRequest` into a normalized
//! `ShipmentResult` by calling third-party tracking providers one after the
//! other until one of them produces data.
//!
//! # Architecture
//!
//! 1. **Select** - `selector` computes the ordered candidate list from the
//!    immutable provider configuration and the requested mode
//! 2. **Attempt** - each `adapters` implementation performs its network calls
//!    through the shared `ProviderClient` and normalizes the payload
//! 3. **Classify** - adapters report an `AttemptOutcome` (success,
//!    recoverable or fatal)
//! 4. **Resolve** - `orchestrator` walks the candidates sequentially and
//!    turns the final outcome into a result or a `RelayError`
//!
//! # Example
//!
//! ```no_run
//! use relay_core::{Credentials, ProviderConfig, ProviderKind, TrackingRequest};
//! use relay_providers::{ProviderClient, TrackingService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let configs = vec![ProviderConfig::new(
//!     ProviderKind::Track17,
//!     "https://api.17track.net/track/v2.2",
//!     Some(Credentials::ApiKey("token".to_string())),
//! )];
//! let service = TrackingService::new(configs, ProviderClient::with_defaults()?);
//!
//! let shipment = service.track(&TrackingRequest::new("ABC123")?).await?;
//! println!("{} events via {}", shipment.events.len(), shipment.provider);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapters;
pub mod client;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod outcome;
pub mod selector;
pub mod service;

pub use adapters::TrackingProvider;
pub use client::{ClientConfig, ProviderClient, ProviderResponse, ResponseBody};
pub use error::{ProviderError, Result};
pub use orchestrator::FallbackOrchestrator;
pub use outcome::AttemptOutcome;
pub use selector::{select_order, Selection, SelectionMode};
pub use service::TrackingService;

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
