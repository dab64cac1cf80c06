//! Event records and strongly-typed identifiers.
//!
//! `EventRecord` is the one canonical shape both normalization branches
//! produce. `StoredEvent` is what the store hands back: the same columns, but
//! loosely typed, because rows written outside the normalizer may carry an
//! unknown action type or missing fields.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Storage identifier of a persisted event row.
///
/// Assigned by the store on insert. Distinct from the GitHub-derived
/// `request_id`, which is neither unique nor always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<PgDb> for EventId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for EventId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for EventId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Classification of a repository activity.
///
/// Only these three values are visible through the event feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Commits pushed to a branch
    Push,
    /// Pull request opened
    PullRequest,
    /// Pull request closed with its branch merged
    Merge,
}

impl ActionType {
    /// All valid action types.
    pub const ALL: [Self; 3] = [Self::Push, Self::PullRequest, Self::Merge];

    /// Returns the stored string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that is not a valid action type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type: {0}")]
pub struct UnknownActionType(pub String);

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(Self::Push),
            "pull_request" => Ok(Self::PullRequest),
            "merge" => Ok(Self::Merge),
            other => Err(UnknownActionType(other.to_string())),
        }
    }
}

/// Canonical record produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Short commit hash for pushes, pull request id otherwise
    pub request_id: String,
    /// What happened
    pub action_type: ActionType,
    /// GitHub login or pusher name
    pub author: String,
    /// Source branch; pushes have none
    pub from_branch: Option<String>,
    /// Target branch
    pub to_branch: String,
    /// Time the webhook was received
    pub timestamp: DateTime<Utc>,
}

/// Event row as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredEvent {
    /// Storage identifier
    pub id: EventId,
    /// GitHub-derived identifier, if recorded
    pub request_id: Option<String>,
    /// Raw action type; may be outside the valid set
    pub action_type: Option<String>,
    /// Event author, if recorded
    pub author: Option<String>,
    /// Source branch, if any
    pub from_branch: Option<String>,
    /// Target branch, if recorded
    pub to_branch: Option<String>,
    /// Receive time, if recorded
    #[sqlx(rename = "recorded_at")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl StoredEvent {
    /// Builds the row the store holds for a freshly inserted record.
    pub fn from_record(id: EventId, record: &EventRecord) -> Self {
        Self {
            id,
            request_id: Some(record.request_id.clone()),
            action_type: Some(record.action_type.as_str().to_string()),
            author: Some(record.author.clone()),
            from_branch: record.from_branch.clone(),
            to_branch: Some(record.to_branch.clone()),
            timestamp: Some(record.timestamp),
        }
    }

    /// Returns the action type if it is one of the valid values.
    pub fn valid_action_type(&self) -> Option<ActionType> {
        self.action_type.as_deref().and_then(|s| s.parse().ok())
    }
}
