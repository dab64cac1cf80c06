//! Repository for the `github_events` table.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::StoreResult,
    models::{EventId, EventRecord, StoredEvent},
};

/// Repository for normalized GitHub events.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Creates the table and index if they do not exist.
    ///
    /// No constraint is placed on `action_type`; rows with other values are
    /// filtered on the read path.
    ///
    /// # Errors
    ///
    /// Returns error if either statement fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS github_events (
                id UUID PRIMARY KEY,
                request_id TEXT,
                action_type TEXT,
                author TEXT,
                from_branch TEXT,
                to_branch TEXT,
                recorded_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&*self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_github_events_recorded_at
            ON github_events(recorded_at DESC NULLS LAST)
            "#,
        )
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a normalized record under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn create(&self, record: &EventRecord) -> StoreResult<EventId> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO github_events (
                id, request_id, action_type, author, from_branch, to_branch, recorded_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7
            )
            RETURNING id
            "#,
        )
        .bind(EventId::new())
        .bind(&record.request_id)
        .bind(record.action_type.as_str())
        .bind(&record.author)
        .bind(&record.from_branch)
        .bind(&record.to_branch)
        .bind(record.timestamp)
        .fetch_one(&*self.pool)
        .await?;

        Ok(id)
    }

    /// Returns up to `limit` rows, newest first, rows without a timestamp
    /// last.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_latest(&self, limit: usize) -> StoreResult<Vec<StoredEvent>> {
        let events = sqlx::query_as::<_, StoredEvent>(
            r#"
            SELECT id, request_id, action_type, author, from_branch, to_branch, recorded_at
            FROM github_events
            ORDER BY recorded_at DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await?;

        Ok(events)
    }

    /// Deletes every row and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    pub async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM github_events").execute(&*self.pool).await?;

        Ok(result.rows_affected())
    }
}
