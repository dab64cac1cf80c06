//! Error types for event ingestion and the event store.
//!
//! Two failure families exist: payloads that do not carry the fields a
//! handled event kind needs, and store operations that fail. Both reach the
//! HTTP boundary as a generic failure carrying the error message; codes are
//! kept for log correlation only.

use thiserror::Error;

/// Result type alias using `HooklineError`.
pub type Result<T> = std::result::Result<T, HooklineError>;

/// Result type alias for repository operations.
pub type StoreResult<T> = std::result::Result<T, CoreError>;

/// Store-level error for repository operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Hookline error types.
#[derive(Debug, Error)]
pub enum HooklineError {
    /// Payload is not JSON, or lacks a field the event kind requires (E1001).
    #[error("[E1001] Malformed {event_kind} payload: {reason}")]
    MalformedPayload {
        /// Event kind taken from the `X-GitHub-Event` header
        event_kind: String,
        /// Decoder message naming the offending field
        reason: String,
    },

    /// Event store operation failed (E3001).
    #[error("[E3001] Event store failure: {0}")]
    Store(#[from] CoreError),

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HooklineError {
    /// Builds a `MalformedPayload` from a serde decode failure.
    pub fn malformed(event_kind: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::MalformedPayload { event_kind: event_kind.into(), reason: err.to_string() }
    }

    /// Returns the error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "E1001",
            Self::Store(_) => "E3001",
            Self::Other(_) => "E9999",
        }
    }
}

impl From<sqlx::Error> for HooklineError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(CoreError::from(err))
    }
}
