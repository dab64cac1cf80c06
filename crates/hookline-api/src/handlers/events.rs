//! Event feed and bulk clear.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookline_core::build_feed;
use tracing::{debug, instrument, warn};

use super::{create_error_response, StatusResponse};
use crate::AppState;

/// Returns the latest events, newest first, with display fields attached.
#[instrument(name = "list_events", skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Response {
    match state.store.find_latest(state.events_limit).await {
        Ok(events) => {
            let feed = build_feed(events);
            debug!(count = feed.len(), "Serving event feed");
            (StatusCode::OK, Json(feed)).into_response()
        },
        Err(e) => create_error_response(&e),
    }
}

/// Deletes every stored event. Intended for resetting test deployments.
#[instrument(name = "clear_events", skip(state))]
pub async fn clear_events(State(state): State<AppState>) -> Response {
    match state.store.delete_all().await {
        Ok(removed) => {
            warn!(removed, "Cleared all events");
            (StatusCode::OK, Json(StatusResponse { status: "cleared" })).into_response()
        },
        Err(e) => create_error_response(&e),
    }
}
