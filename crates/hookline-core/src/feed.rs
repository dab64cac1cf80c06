//! Read path: turns the latest stored rows into display-ready views.
//!
//! Only rows with a valid action type survive; this is the single place that
//! keeps foreign or legacy rows out of the API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    display::{display_text, format_timestamp, Timestamp},
    models::{ActionType, EventId, StoredEvent},
};

/// Maximum number of rows the feed fetches.
pub const FEED_LIMIT: usize = 50;

/// One entry of the event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// Storage identifier
    pub id: EventId,
    /// GitHub-derived identifier
    pub request_id: Option<String>,
    /// Validated action type
    pub action_type: ActionType,
    /// Event author
    pub author: Option<String>,
    /// Source branch
    pub from_branch: Option<String>,
    /// Target branch
    pub to_branch: Option<String>,
    /// Receive time
    pub timestamp: Option<DateTime<Utc>>,
    /// Timestamp in display form
    pub formatted_timestamp: String,
    /// Sentence describing the event
    pub display_text: String,
}

impl EventView {
    /// Builds a view, or `None` when the row's action type is not valid.
    pub fn from_stored(event: StoredEvent) -> Option<Self> {
        let action_type = event.valid_action_type()?;
        let formatted_timestamp = format_timestamp(event.timestamp.map(Timestamp::from).as_ref());
        let display_text = display_text(&event, &formatted_timestamp);

        Some(Self {
            id: event.id,
            request_id: event.request_id,
            action_type,
            author: event.author,
            from_branch: event.from_branch,
            to_branch: event.to_branch,
            timestamp: event.timestamp,
            formatted_timestamp,
            display_text,
        })
    }
}

/// Filters and renders rows already ordered newest first.
pub fn build_feed(events: Vec<StoredEvent>) -> Vec<EventView> {
    let fetched = events.len();
    let views: Vec<EventView> = events.into_iter().filter_map(EventView::from_stored).collect();

    if views.len() < fetched {
        debug!(fetched, kept = views.len(), "Dropped rows with invalid action type");
    }

    views
}
