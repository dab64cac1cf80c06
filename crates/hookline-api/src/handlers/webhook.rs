//! GitHub webhook ingestion.
//!
//! Reads the event kind from `X-GitHub-Event`, normalizes the body and stores
//! the resulting record. Ignored deliveries still answer `success` so GitHub
//! does not mark them as failed.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use hookline_core::{
    format_record, normalize, normalize::EVENT_HEADER, EventId, EventKind, Normalized,
    RawEventEnvelope, Result,
};
use tracing::{debug, info, instrument};

use super::{create_error_response, StatusResponse};
use crate::AppState;

/// Receives one GitHub delivery.
///
/// # Errors
///
/// Responds 500 when the body is malformed for its event kind or the store
/// insert fails.
#[instrument(
    name = "receive_webhook",
    skip(state, headers, body),
    fields(
        event_kind = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("none"),
        delivery = headers.get("x-github-delivery").and_then(|v| v.to_str().ok()).unwrap_or("none"),
        content_length = body.len(),
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event_kind =
        EventKind::from_header(headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok()));

    match ingest(&state, event_kind, &body).await {
        Ok(_) => (StatusCode::OK, Json(StatusResponse { status: "success" })).into_response(),
        Err(e) => create_error_response(&e),
    }
}

/// Normalizes and stores a delivery, returning the stored id if any.
async fn ingest(state: &AppState, event_kind: EventKind, body: &[u8]) -> Result<Option<EventId>> {
    let envelope = RawEventEnvelope::parse(event_kind, body)?;

    match normalize(&envelope, state.clock.now_utc())? {
        Normalized::Record(record) => {
            let summary = format_record(&record);
            let event_id = state.store.insert(record).await?;
            info!(event_id = %event_id, "{summary}");
            Ok(Some(event_id))
        },
        Normalized::Ignored(reason) => {
            debug!(%reason, "Delivery ignored");
            Ok(None)
        },
    }
}
