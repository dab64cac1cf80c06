//! Core of the hookline GitHub webhook receiver.
//!
//! Normalizes `push` and `pull_request` deliveries into one canonical record,
//! renders stored records as sentences, and defines the event store the HTTP
//! layer writes to and reads from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod display;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod store;
pub mod time;

pub use display::{format_instant, format_record, format_timestamp, Timestamp};
pub use error::{CoreError, HooklineError, Result};
pub use feed::{build_feed, EventView, FEED_LIMIT};
pub use models::{ActionType, EventId, EventRecord, StoredEvent};
pub use normalize::{normalize, EventKind, IgnoreReason, Normalized, RawEventEnvelope};
pub use store::{EventStore, PostgresEventStore};
pub use time::{Clock, RealClock, TestClock};
