//! Error responses at the HTTP edge.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::RelayError;
use serde::Serialize;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable error code.
    pub code: &'static str,
    /// Actionable hint, usually naming configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Provider the error is attributed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Internal detail, only outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A `RelayError` ready to be rendered as a response.
#[derive(Debug)]
pub struct ApiError {
    error: RelayError,
    expose_details: bool,
}

impl ApiError {
    /// Wraps an error. `expose_details` should be false in production.
    pub fn new(error: RelayError, expose_details: bool) -> Self {
        Self { error, expose_details }
    }

    /// The wrapped error.
    pub fn error(&self) -> &RelayError {
        &self.error
    }

    fn body(&self) -> ErrorResponse {
        let details = match &self.error {
            RelayError::Other(source) if self.expose_details => Some(format!("{source:#}")),
            _ => None,
        };
        let error = match &self.error {
            RelayError::Other(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            error,
            code: self.error.code(),
            hint: self.error.hint(),
            provider: self.error.provider().map(|kind| kind.as_str().to_string()),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.error.is_validation() {
            tracing::debug!(code = self.error.code(), error = %self.error, "Invalid request");
        } else if status.is_server_error() {
            tracing::error!(code = self.error.code(), error = %self.error, "Request failed");
        } else {
            tracing::warn!(code = self.error.code(), error = %self.error, "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
