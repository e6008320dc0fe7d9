//! Link statistics service.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Number of links reported in [`StatsSummary::top_links`].
pub const TOP_LINKS: i64 = 5;

/// Service-wide link statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_links: i64,
    pub total_clicks: i64,
    /// Links created since midnight UTC.
    pub links_today: i64,
    /// Mean clicks per link, rounded to the nearest integer.
    pub average_clicks: i64,
    pub top_links: Vec<Link>,
}

pub struct StatsService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: LinkRepository + ?Sized> StatsService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Aggregates totals as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on store failures.
    pub async fn summary(&self, now: DateTime<Utc>) -> Result<StatsSummary, AppError> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        let summary = self.repository.summary(midnight, TOP_LINKS).await?;

        let average_clicks = if summary.total_links > 0 {
            (summary.total_clicks as f64 / summary.total_links as f64).round() as i64
        } else {
            0
        };

        Ok(StatsSummary {
            total_links: summary.total_links,
            total_clicks: summary.total_clicks,
            links_today: summary.links_since,
            average_clicks,
            top_links: summary.top_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{LinkSummary, MockLinkRepository};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_summary_uses_utc_midnight_and_rounds_average() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();

        let mut repo = MockLinkRepository::new();
        repo.expect_summary()
            .withf(move |since, top| *since == midnight && *top == TOP_LINKS)
            .times(1)
            .returning(|_, _| {
                Ok(LinkSummary {
                    total_links: 4,
                    total_clicks: 10,
                    links_since: 1,
                    top_links: vec![],
                })
            });

        let summary = StatsService::new(Arc::new(repo)).summary(now).await.unwrap();

        assert_eq!(summary.total_links, 4);
        assert_eq!(summary.links_today, 1);
        // 10 / 4 = 2.5 rounds half up
        assert_eq!(summary.average_clicks, 3);
    }

    #[tokio::test]
    async fn test_empty_store_has_zero_average() {
        let mut repo = MockLinkRepository::new();
        repo.expect_summary()
            .returning(|_, _| Ok(LinkSummary::default()));

        let summary = StatsService::new(Arc::new(repo))
            .summary(Utc::now())
            .await
            .unwrap();

        assert_eq!(summary.average_clicks, 0);
        assert!(summary.top_links.is_empty());
    }
}
