//! HTTP boundary for the parcel tracking relay.
//!
//! Validates tracking queries, answers CORS preflights, serves mock data and
//! the diagnostic report, and renders relay errors as JSON bodies. Provider
//! selection and fallback live in `relay-providers`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod mock;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ErrorResponse};
pub use server::{create_router, start_server};
pub use state::AppState;
