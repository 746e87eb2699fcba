//! Core domain models and error taxonomy.
//!
//! Provides the provider identifiers, request and shipment shapes, and the
//! caller-facing error type shared by the provider and HTTP crates. Nothing in
//! here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod time;

pub use error::{RelayError, Result};
pub use models::{
    Carrier, Credentials, ProviderConfig, ProviderKind, RequestedProvider, ShipmentResult,
    TrackingEvent, TrackingRequest,
};
pub use time::{Clock, ManualClock, SystemClock};
