//! Maps GitHub webhook deliveries onto canonical event records.
//!
//! Each handled event kind decodes a small struct naming only the fields it
//! reads, straight from the parsed JSON tree. A missing or mistyped field
//! yields `MalformedPayload`; an event kind or pull request action that is
//! not recorded yields `Normalized::Ignored`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{HooklineError, Result},
    models::{ActionType, EventRecord},
};

/// Header carrying the GitHub event name.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Length of the commit hash prefix used as a push request id.
const SHORT_SHA_LEN: usize = 8;

/// GitHub event name from the delivery header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `push`
    Push,
    /// `pull_request`
    PullRequest,
    /// Any other event name
    Other(String),
    /// No event header was sent
    Missing,
}

impl EventKind {
    /// Classifies an optional header value.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("push") => Self::Push,
            Some("pull_request") => Self::PullRequest,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Missing,
        }
    }

    /// Returns the event name as sent by GitHub.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Other(name) => name,
            Self::Missing => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook delivery: event kind plus parsed JSON body.
#[derive(Debug, Clone)]
pub struct RawEventEnvelope {
    /// Kind taken from the event header
    pub event_kind: EventKind,
    /// Parsed request body
    pub body: serde_json::Value,
}

impl RawEventEnvelope {
    /// Parses a request body. Fails when the body is not JSON, regardless of
    /// event kind.
    pub fn parse(event_kind: EventKind, body: &[u8]) -> Result<Self> {
        let body = serde_json::from_slice(body)
            .map_err(|e| HooklineError::malformed(event_kind.as_str(), &e))?;
        Ok(Self { event_kind, body })
    }
}

/// Outcome of normalizing one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Delivery maps to a record that should be stored
    Record(EventRecord),
    /// Delivery is accepted but not recorded
    Ignored(IgnoreReason),
}

/// Why a delivery produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No `X-GitHub-Event` header
    MissingEventKind,
    /// Event kind other than push or pull_request
    UnsupportedEvent(String),
    /// Pull request action that is neither `opened` nor a merge
    PullRequestAction(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEventKind => f.write_str("missing event header"),
            Self::UnsupportedEvent(kind) => write!(f, "unsupported event kind {kind}"),
            Self::PullRequestAction(action) => write!(f, "pull request action {action}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    pusher: Pusher,
    #[serde(rename = "ref")]
    git_ref: String,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pusher {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: String,
    pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    #[serde(default)]
    id: Option<u64>,
    user: User,
    head: BranchRef,
    base: BranchRef,
    #[serde(default)]
    merged: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

/// Normalizes a delivery received at `now`.
///
/// # Errors
///
/// Returns `HooklineError::MalformedPayload` when a handled event kind lacks
/// a field it needs.
pub fn normalize(envelope: &RawEventEnvelope, now: DateTime<Utc>) -> Result<Normalized> {
    match &envelope.event_kind {
        EventKind::Push => normalize_push(&envelope.body, now).map(Normalized::Record),
        EventKind::PullRequest => normalize_pull_request(&envelope.body, now),
        EventKind::Other(kind) => {
            Ok(Normalized::Ignored(IgnoreReason::UnsupportedEvent(kind.clone())))
        },
        EventKind::Missing => Ok(Normalized::Ignored(IgnoreReason::MissingEventKind)),
    }
}

fn normalize_push(body: &serde_json::Value, now: DateTime<Utc>) -> Result<EventRecord> {
    let payload =
        PushPayload::deserialize(body).map_err(|e| HooklineError::malformed("push", &e))?;

    Ok(EventRecord {
        request_id: payload
            .after
            .as_deref()
            .map(|sha| sha.chars().take(SHORT_SHA_LEN).collect())
            .unwrap_or_default(),
        action_type: ActionType::Push,
        author: payload.pusher.name,
        from_branch: None,
        to_branch: branch_name(&payload.git_ref).to_string(),
        timestamp: now,
    })
}

fn normalize_pull_request(body: &serde_json::Value, now: DateTime<Utc>) -> Result<Normalized> {
    let payload = PullRequestPayload::deserialize(body)
        .map_err(|e| HooklineError::malformed("pull_request", &e))?;
    let pr = payload.pull_request;

    let action_type = match (payload.action.as_str(), pr.merged) {
        ("opened", _) => ActionType::PullRequest,
        ("closed", Some(true)) => ActionType::Merge,
        ("closed", None) => {
            return Err(HooklineError::MalformedPayload {
                event_kind: "pull_request".to_string(),
                reason: "missing field `pull_request.merged`".to_string(),
            })
        },
        (other, _) => {
            return Ok(Normalized::Ignored(IgnoreReason::PullRequestAction(other.to_string())))
        },
    };

    let id = pr.id.ok_or_else(|| HooklineError::MalformedPayload {
        event_kind: "pull_request".to_string(),
        reason: "missing field `pull_request.id`".to_string(),
    })?;

    Ok(Normalized::Record(EventRecord {
        request_id: id.to_string(),
        action_type,
        author: pr.user.login,
        from_branch: Some(pr.head.name),
        to_branch: pr.base.name,
        timestamp: now,
    }))
}

/// Last `/`-separated segment of a git ref.
fn branch_name(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}
