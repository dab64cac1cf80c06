//! Event store gateway.
//!
//! The HTTP layer depends on `EventStore` rather than on PostgreSQL directly,
//! so handlers can be exercised against the in-memory store in `mock`.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{
    error::Result,
    models::{EventId, EventRecord, StoredEvent},
    storage::Storage,
};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Operations the service needs from persistent storage.
pub trait EventStore: Send + Sync + 'static {
    /// Persists one normalized record and returns its storage id.
    fn insert(&self, record: EventRecord) -> StoreFuture<'_, EventId>;

    /// Returns up to `limit` rows ordered by timestamp, newest first.
    fn find_latest(&self, limit: usize) -> StoreFuture<'_, Vec<StoredEvent>>;

    /// Removes every row, returning how many were deleted.
    fn delete_all(&self) -> StoreFuture<'_, u64>;

    /// Checks that the backing store is reachable.
    fn health_check(&self) -> StoreFuture<'_, ()>;
}

/// Production store backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresEventStore {
    storage: Arc<Storage>,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL store adapter.
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl EventStore for PostgresEventStore {
    fn insert(&self, record: EventRecord) -> StoreFuture<'_, EventId> {
        let storage = self.storage.clone();
        Box::pin(async move { Ok(storage.github_events.create(&record).await?) })
    }

    fn find_latest(&self, limit: usize) -> StoreFuture<'_, Vec<StoredEvent>> {
        let storage = self.storage.clone();
        Box::pin(async move { Ok(storage.github_events.find_latest(limit).await?) })
    }

    fn delete_all(&self) -> StoreFuture<'_, u64> {
        let storage = self.storage.clone();
        Box::pin(async move { Ok(storage.github_events.delete_all().await?) })
    }

    fn health_check(&self) -> StoreFuture<'_, ()> {
        let storage = self.storage.clone();
        Box::pin(async move { Ok(storage.health_check().await?) })
    }
}

pub mod mock {
    //! In-memory store for tests.
    //!
    //! Keeps rows in insertion order and can be told to fail every operation
    //! to simulate an unreachable database.

    use std::sync::Arc;

    use tokio::sync::RwLock;

    use super::{EventStore, StoreFuture};
    use crate::{
        error::{CoreError, HooklineError},
        models::{EventId, EventRecord, StoredEvent},
    };

    /// In-memory `EventStore`.
    #[derive(Clone, Default)]
    pub struct InMemoryEventStore {
        events: Arc<RwLock<Vec<StoredEvent>>>,
        failure: Arc<RwLock<Option<String>>>,
    }

    impl InMemoryEventStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a row as-is, bypassing normalization.
        pub async fn insert_stored(&self, event: StoredEvent) {
            self.events.write().await.push(event);
        }

        /// Makes every subsequent operation fail with `message`, or clears
        /// the failure when `None`.
        pub async fn fail_with(&self, message: Option<&str>) {
            *self.failure.write().await = message.map(str::to_string);
        }

        /// Returns all rows in insertion order.
        pub async fn all(&self) -> Vec<StoredEvent> {
            self.events.read().await.clone()
        }

        /// Returns the number of stored rows.
        pub async fn len(&self) -> usize {
            self.events.read().await.len()
        }

        /// Returns true when no rows are stored.
        pub async fn is_empty(&self) -> bool {
            self.events.read().await.is_empty()
        }

        async fn check_failure(&self) -> crate::error::Result<()> {
            match self.failure.read().await.as_ref() {
                Some(message) => Err(HooklineError::Store(CoreError::Database(message.clone()))),
                None => Ok(()),
            }
        }
    }

    impl EventStore for InMemoryEventStore {
        fn insert(&self, record: EventRecord) -> StoreFuture<'_, EventId> {
            Box::pin(async move {
                self.check_failure().await?;
                let id = EventId::new();
                self.events.write().await.push(StoredEvent::from_record(id, &record));
                Ok(id)
            })
        }

        fn find_latest(&self, limit: usize) -> StoreFuture<'_, Vec<StoredEvent>> {
            Box::pin(async move {
                self.check_failure().await?;
                // Newest insertion first so equal timestamps keep arrival order.
                let mut events: Vec<StoredEvent> =
                    self.events.read().await.iter().rev().cloned().collect();
                events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                events.truncate(limit);
                Ok(events)
            })
        }

        fn delete_all(&self) -> StoreFuture<'_, u64> {
            Box::pin(async move {
                self.check_failure().await?;
                let mut events = self.events.write().await;
                let removed = events.len() as u64;
                events.clear();
                Ok(removed)
            })
        }

        fn health_check(&self) -> StoreFuture<'_, ()> {
            Box::pin(async move { self.check_failure().await })
        }
    }
}
