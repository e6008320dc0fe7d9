//! Deadline enforcement for store calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{AttemptWindow, Link, LinkPatch, NewAttempt, NewLink};
use crate::domain::repositories::{AttemptRepository, LinkRepository, LinkSummary};
use crate::error::AppError;

/// Wraps a repository so that every call fails with
/// [`AppError::StoreUnavailable`] once `timeout` elapses.
pub struct Bounded<R: ?Sized> {
    inner: Arc<R>,
    timeout: Duration,
}

impl<R: ?Sized> Bounded<R> {
    pub fn new(inner: Arc<R>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(AppError::store_unavailable(
                    "Record store timed out",
                    json!({ "operation": operation }),
                ))
            }
        }
    }
}

#[async_trait]
impl<R: LinkRepository + ?Sized> LinkRepository for Bounded<R> {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.run("find_by_code", self.inner.find_by_code(code)).await
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.run("insert_link", self.inner.insert(new_link)).await
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        self.run("update_link", self.inner.update(code, patch)).await
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        self.run("delete_link", self.inner.delete(code)).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Link>, i64), AppError> {
        self.run("list_links", self.inner.list(offset, limit)).await
    }

    async fn record_click(
        &self,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError> {
        self.run("record_click", self.inner.record_click(code, at)).await
    }

    async fn summary(&self, since: DateTime<Utc>, top: i64) -> Result<LinkSummary, AppError> {
        self.run("summary", self.inner.summary(since, top)).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.run("ping", self.inner.ping()).await
    }
}

#[async_trait]
impl<R: AttemptRepository + ?Sized> AttemptRepository for Bounded<R> {
    async fn window_since(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> Result<AttemptWindow, AppError> {
        self.run("window_since", self.inner.window_since(client_id, since))
            .await
    }

    async fn insert(&self, attempt: NewAttempt) -> Result<(), AppError> {
        self.run("insert_attempt", self.inner.insert(attempt)).await
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        self.run("prune_attempts", self.inner.prune_before(cutoff))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    struct Stalled;

    #[async_trait]
    impl AttemptRepository for Stalled {
        async fn window_since(
            &self,
            _client_id: &str,
            _since: DateTime<Utc>,
        ) -> Result<AttemptWindow, AppError> {
            std::future::pending().await
        }

        async fn insert(&self, _attempt: NewAttempt) -> Result<(), AppError> {
            std::future::pending().await
        }

        async fn prune_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, AppError> {
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_call_becomes_store_unavailable() {
        let bounded = Bounded::new(Arc::new(Stalled), Duration::from_millis(50));

        let err = bounded.window_since("c1", Utc::now()).await.unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let bounded = Bounded::new(Arc::new(Stalled), Duration::from_millis(50));

        assert_eq!(bounded.prune_before(Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inner_errors_are_preserved() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete()
            .returning(|code| Err(AppError::not_found("missing", json!({ "code": code }))));

        let bounded = Bounded::new(Arc::new(repo), Duration::from_secs(1));

        assert!(matches!(
            bounded.delete("abc123").await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }
}
