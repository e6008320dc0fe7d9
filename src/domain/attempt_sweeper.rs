//! Background garbage collection of attempt records.
//!
//! Attempts older than the rate-limit window never influence a decision again,
//! so they are deleted periodically to keep the window query cheap.

use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::domain::repositories::AttemptRepository;

/// Prunes attempts older than `window` once per `every`, forever.
///
/// Store failures are logged and the next tick tries again.
pub async fn run_attempt_sweeper<A>(repository: Arc<A>, window: TimeDelta, every: Duration)
where
    A: AttemptRepository + ?Sized,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sweep_once(repository.as_ref(), window).await;
    }
}

/// Runs a single pruning pass and returns the number of removed records.
pub async fn sweep_once<A>(repository: &A, window: TimeDelta) -> u64
where
    A: AttemptRepository + ?Sized,
{
    let cutoff = Utc::now() - window;

    match repository.prune_before(cutoff).await {
        Ok(0) => 0,
        Ok(removed) => {
            tracing::debug!(removed, %cutoff, "Pruned expired attempts");
            metrics::counter!("attempts_pruned_total").increment(removed);
            removed
        }
        Err(e) => {
            tracing::warn!(error = %e, "Attempt sweep failed");
            0
        }
    }
}
