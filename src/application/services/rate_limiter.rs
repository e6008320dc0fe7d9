//! Sliding-window rate limiter for client link mutations.
//!
//! Every check counts the client's attempts in `[now - window, now]`, so old
//! attempts roll off one by one instead of the whole budget resetting at a
//! fixed boundary.
//!
//! Count-then-insert is not atomic: concurrent requests from one client can
//! both observe a count below the limit. The limit is therefore soft, which is
//! acceptable for an identifier the client can reset at will.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::entities::{AttemptAction, NewAttempt};
use crate::domain::repositories::AttemptRepository;
use crate::error::AppError;

/// Attempts allowed per window by default.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default window length in seconds (8 hours).
pub const DEFAULT_WINDOW_SECS: i64 = 8 * 60 * 60;

/// Limit and window applied to every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: TimeDelta,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: TimeDelta::seconds(DEFAULT_WINDOW_SECS),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// `retry_after` is informational: nothing enforces backoff beyond the
    /// next check.
    Denied { retry_after: TimeDelta },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Converts a denial into [`AppError::RateLimited`] with whole seconds,
    /// rounded up and never below one.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied { retry_after } => {
                let millis = retry_after.num_milliseconds().max(0);
                let secs = ((millis + 999) / 1000).max(1) as u64;
                Err(AppError::rate_limited(secs))
            }
        }
    }
}

pub struct RateLimiter<A: AttemptRepository + ?Sized> {
    repository: Arc<A>,
    policy: RateLimitPolicy,
}

impl<A: AttemptRepository + ?Sized> RateLimiter<A> {
    pub fn new(repository: Arc<A>, policy: RateLimitPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Decides whether `client_id` may perform another mutation at `now`
    /// without recording anything. `None` marks a trusted caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the window cannot be read.
    pub async fn check(
        &self,
        client_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RateDecision, AppError> {
        let Some(client_id) = client_id else {
            return Ok(RateDecision::Allowed);
        };

        let since = now
            .checked_sub_signed(self.policy.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window = self.repository.window_since(client_id, since).await?;

        if window.count < i64::from(self.policy.max_attempts) {
            return Ok(RateDecision::Allowed);
        }

        let oldest = window.oldest.unwrap_or(now);
        let retry_after = oldest
            .checked_add_signed(self.policy.window)
            .map_or(self.policy.window, |until| until - now)
            .max(TimeDelta::zero());

        metrics::counter!("rate_limit_denied_total").increment(1);
        tracing::info!(
            client_id,
            count = window.count,
            retry_after_secs = retry_after.num_seconds(),
            "Client rate limited"
        );

        Ok(RateDecision::Denied { retry_after })
    }

    /// Appends an attempt for `client_id`.
    ///
    /// Attempt logging is best effort: a failed write is logged and does not
    /// fail the operation that triggered it.
    pub async fn record(&self, client_id: Option<&str>, action: AttemptAction, now: DateTime<Utc>) {
        let Some(client_id) = client_id else {
            return;
        };

        let attempt = NewAttempt {
            client_id: client_id.to_string(),
            action,
            created_at: now,
        };

        if let Err(e) = self.repository.insert(attempt).await {
            tracing::warn!(client_id, %action, error = %e, "Failed to record attempt");
        }
    }

    /// Checks the window and, when allowed, records an attempt at `now`.
    ///
    /// Trusted callers (`client_id = None`) are always allowed and leave no
    /// record.
    pub async fn check_and_consume(
        &self,
        client_id: Option<&str>,
        action: AttemptAction,
        now: DateTime<Utc>,
    ) -> Result<RateDecision, AppError> {
        let decision = self.check(client_id, now).await?;

        if decision.is_allowed() {
            self.record(client_id, action, now).await;
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AttemptWindow;
    use crate::domain::repositories::MockAttemptRepository;
    use serde_json::json;

    fn limiter(repo: MockAttemptRepository) -> RateLimiter<MockAttemptRepository> {
        RateLimiter::new(Arc::new(repo), RateLimitPolicy::default())
    }

    #[tokio::test]
    async fn test_trusted_caller_touches_nothing() {
        let mut repo = MockAttemptRepository::new();
        repo.expect_window_since().times(0);
        repo.expect_insert().times(0);

        let decision = limiter(repo)
            .check_and_consume(None, AttemptAction::Create, Utc::now())
            .await
            .unwrap();

        assert_eq!(decision, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_window_bound_is_now_minus_eight_hours() {
        let now = Utc::now();
        let mut repo = MockAttemptRepository::new();

        repo.expect_window_since()
            .withf(move |client, since| client == "c1" && *since == now - TimeDelta::hours(8))
            .times(1)
            .returning(|_, _| Ok(AttemptWindow::default()));
        repo.expect_insert()
            .withf(move |a| {
                a.client_id == "c1" && a.action == AttemptAction::Update && a.created_at == now
            })
            .times(1)
            .returning(|_| Ok(()));

        let decision = limiter(repo)
            .check_and_consume(Some("c1"), AttemptAction::Update, now)
            .await
            .unwrap();

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_ninth_attempt_in_window_is_allowed() {
        let now = Utc::now();
        let mut repo = MockAttemptRepository::new();

        repo.expect_window_since().returning(move |_, _| {
            Ok(AttemptWindow {
                count: 9,
                oldest: Some(now - TimeDelta::hours(1)),
            })
        });

        let decision = limiter(repo).check(Some("c1"), now).await.unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_denied_at_limit_with_retry_after_from_oldest() {
        let now = Utc::now();
        let mut repo = MockAttemptRepository::new();

        repo.expect_window_since().returning(move |_, _| {
            Ok(AttemptWindow {
                count: 10,
                oldest: Some(now - TimeDelta::hours(3)),
            })
        });
        repo.expect_insert().times(0);

        let decision = limiter(repo)
            .check_and_consume(Some("c1"), AttemptAction::Create, now)
            .await
            .unwrap();

        assert_eq!(
            decision,
            RateDecision::Denied {
                retry_after: TimeDelta::hours(5)
            }
        );
    }

    #[tokio::test]
    async fn test_insert_failure_does_not_fail_check() {
        let mut repo = MockAttemptRepository::new();

        repo.expect_window_since()
            .returning(|_, _| Ok(AttemptWindow::default()));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));

        let decision = limiter(repo)
            .check_and_consume(Some("c1"), AttemptAction::Create, Utc::now())
            .await
            .unwrap();

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_window_read_failure_propagates() {
        let mut repo = MockAttemptRepository::new();

        repo.expect_window_since()
            .returning(|_, _| Err(AppError::store_unavailable("down", json!({}))));

        let err = limiter(repo).check(Some("c1"), Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_oversized_window_does_not_overflow() {
        let mut repo = MockAttemptRepository::new();
        repo.expect_window_since()
            .withf(|_, since| *since == DateTime::<Utc>::MIN_UTC)
            .returning(|_, _| Ok(AttemptWindow::default()));

        let limiter = RateLimiter::new(
            Arc::new(repo),
            RateLimitPolicy {
                max_attempts: 10,
                window: TimeDelta::MAX,
            },
        );

        assert!(limiter.check(Some("c1"), Utc::now()).await.unwrap().is_allowed());
    }

    #[test]
    fn test_denial_rounds_retry_after_up() {
        let err = RateDecision::Denied {
            retry_after: TimeDelta::milliseconds(1500),
        }
        .into_result()
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::RateLimited {
                retry_after_secs: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_retry_after_reports_one_second() {
        let err = RateDecision::Denied {
            retry_after: TimeDelta::zero(),
        }
        .into_result()
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::RateLimited {
                retry_after_secs: 1,
                ..
            }
        ));
    }
}
