//! PostgreSQL implementation of the attempt log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{AttemptWindow, NewAttempt};
use crate::domain::repositories::AttemptRepository;
use crate::error::AppError;

/// PostgreSQL repository for rate-limit attempt records.
///
/// Window queries are served by the `(client_id, created_at)` index.
pub struct PgAttemptRepository {
    pool: Arc<PgPool>,
}

impl PgAttemptRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptRepository for PgAttemptRepository {
    async fn window_since(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> Result<AttemptWindow, AppError> {
        let (count, oldest): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), MIN(created_at)
            FROM client_attempts
            WHERE client_id = $1 AND created_at >= $2
            "#,
        )
        .bind(client_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(AttemptWindow { count, oldest })
    }

    async fn insert(&self, attempt: NewAttempt) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO client_attempts (client_id, action, created_at) VALUES ($1, $2, $3)",
        )
        .bind(&attempt.client_id)
        .bind(attempt.action.as_str())
        .bind(attempt.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM client_attempts WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
