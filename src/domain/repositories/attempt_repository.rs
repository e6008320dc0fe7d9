//! Repository trait for rate-limit attempt records.

use crate::domain::entities::{AttemptWindow, NewAttempt};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the append-only attempt log.
///
/// Attempts are never updated. They are only read through
/// [`AttemptRepository::window_since`] and may be pruned once they fall out
/// of every window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Counts attempts by `client_id` with `created_at >= since` and returns
    /// the oldest such timestamp.
    async fn window_since(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> Result<AttemptWindow, AppError>;

    /// Appends an attempt record.
    async fn insert(&self, attempt: NewAttempt) -> Result<(), AppError>;

    /// Deletes attempts older than `cutoff`, returning how many were removed.
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
