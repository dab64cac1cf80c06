//! Human-readable rendering of stored events.
//!
//! Timestamps render as `DD Month YYYY - hh:mm AM/PM UTC`. Sentences are
//! selected by action type; missing authors read `Unknown` and missing
//! branches read `unknown`.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{ActionType, EventRecord, StoredEvent};

/// Rendered in place of an absent timestamp.
pub const UNKNOWN_TIME: &str = "Unknown time";

const UNKNOWN_AUTHOR: &str = "Unknown";
const UNKNOWN_BRANCH: &str = "unknown";
const DISPLAY_FORMAT: &str = "%d %B %Y - %I:%M %p UTC";

/// A timestamp as found on a record: either a real instant or text written
/// by some other producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// Parsed instant
    Instant(DateTime<Utc>),
    /// Unparsed text
    Text(String),
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Renders an instant in display form.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

/// Renders an optional timestamp.
///
/// Text is read as RFC 3339, or as an offset-less ISO-8601 date-time taken to
/// be UTC. Text that parses as neither is returned unchanged.
pub fn format_timestamp(timestamp: Option<&Timestamp>) -> String {
    match timestamp {
        None => UNKNOWN_TIME.to_string(),
        Some(Timestamp::Instant(instant)) => format_instant(*instant),
        Some(Timestamp::Text(text)) => match parse_iso8601(text) {
            Some(instant) => format_instant(instant),
            None => text.clone(),
        },
    }
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|naive| naive.and_utc())
}

/// Renders the sentence for a stored event.
pub fn display_text(event: &StoredEvent, formatted_timestamp: &str) -> String {
    sentence(
        event.action_type.as_deref(),
        event.author.as_deref(),
        event.from_branch.as_deref(),
        event.to_branch.as_deref(),
        formatted_timestamp,
    )
}

/// Renders the sentence for a freshly normalized record.
pub fn format_record(record: &EventRecord) -> String {
    sentence(
        Some(record.action_type.as_str()),
        Some(&record.author),
        record.from_branch.as_deref(),
        Some(&record.to_branch),
        &format_instant(record.timestamp),
    )
}

fn sentence(
    action_type: Option<&str>,
    author: Option<&str>,
    from_branch: Option<&str>,
    to_branch: Option<&str>,
    timestamp: &str,
) -> String {
    let author = author.unwrap_or(UNKNOWN_AUTHOR);
    let from = from_branch.unwrap_or(UNKNOWN_BRANCH);
    let to = to_branch.unwrap_or(UNKNOWN_BRANCH);

    match action_type.and_then(|s| s.parse::<ActionType>().ok()) {
        Some(ActionType::Push) => format!("\"{author}\" pushed to \"{to}\" on {timestamp}"),
        Some(ActionType::PullRequest) => format!(
            "\"{author}\" submitted a pull request from \"{from}\" to \"{to}\" on {timestamp}"
        ),
        Some(ActionType::Merge) => {
            format!("\"{author}\" merged branch \"{from}\" to \"{to}\" on {timestamp}")
        },
        None => format!("Unknown event by {author} on {timestamp}"),
    }
}
