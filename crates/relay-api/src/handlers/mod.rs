//! HTTP request handlers for the tracking relay.
//!
//! Handlers follow one pattern:
//! - Input validation before any provider is contacted
//! - Tracing spans per request
//! - Errors rendered through `ApiError` with codes from the relay taxonomy
//!
//! # Handler Organization
//!
//! - `track` - tracking lookups, mock mode and CORS preflight
//! - `diagnostics` - the `test=true` configuration and reachability report
//! - `health` - liveness probe

pub mod diagnostics;
pub mod health;
pub mod track;

pub use diagnostics::{build_report, DiagnosticReport};
pub use health::liveness_check;
pub use track::{preflight, track_shipment};
