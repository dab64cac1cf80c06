//! PostgreSQL access layer.
//!
//! All SQL lives in this module's repositories. The `github_events` table is
//! the only persisted state.

use std::sync::Arc;

use sqlx::PgPool;

pub mod github_events;

use crate::error::StoreResult;

/// Container for repository instances sharing one connection pool.
#[derive(Clone)]
pub struct Storage {
    /// Repository for normalized GitHub events.
    pub github_events: Arc<github_events::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self { github_events: Arc::new(github_events::Repository::new(pool)) }
    }

    /// Creates the events table and its timestamp index if missing.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if either statement fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.github_events.ensure_schema().await
    }

    /// Verifies database connectivity with a trivial query.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> StoreResult<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.github_events.pool()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_can_be_created() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://localhost/github_webhooks").unwrap();
        let _storage = Storage::new(pool);
    }
}
