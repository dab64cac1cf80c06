//! HTTP request handlers for the hookline API.
//!
//! - `webhook` - GitHub delivery ingestion
//! - `events` - event feed and bulk clear
//! - `index` - the polling dashboard page
//! - `health` - health and liveness probes
//!
//! Failures on any route collapse into a 500 carrying `{"error": message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookline_core::HooklineError;
use serde::Serialize;
use tracing::error;

pub mod events;
pub mod health;
pub mod index;
pub mod webhook;

pub use events::{clear_events, list_events};
pub use health::{health_check, liveness_check};
pub use index::index;
pub use webhook::receive_webhook;

/// Body of a successful mutation.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// `success` or `cleared`
    pub status: &'static str,
}

/// Body of a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Logs an error and renders it as a 500 response.
pub(crate) fn create_error_response(err: &HooklineError) -> Response {
    error!(code = err.code(), error = %err, "Request failed");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: err.to_string() }))
        .into_response()
}
