//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Aggregate figures over all stored links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkSummary {
    pub total_links: i64,
    pub total_clicks: i64,
    /// Links created at or after the `since` bound passed to [`LinkRepository::summary`].
    pub links_since: i64,
    /// Most clicked links, highest first.
    pub top_links: Vec<Link>,
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - process-local store
/// - [`crate::infrastructure::persistence::Bounded`] - timeout decorator over either
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a live link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be reached.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if the code violates the uniqueness
    /// constraint, even when an earlier existence check saw it free.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Points an existing link at a new target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has `code`.
    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError>;

    /// Hard-deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has `code`.
    async fn delete(&self, code: &str) -> Result<(), AppError>;

    /// Lists links newest first, together with the total number of links.
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Link>, i64), AppError>;

    /// Atomically increments the click counter and stamps `last_clicked_at`.
    ///
    /// Returns the updated link, or `None` if no link has `code`.
    async fn record_click(&self, code: &str, at: DateTime<Utc>)
    -> Result<Option<Link>, AppError>;

    /// Computes totals plus the `top` most clicked links.
    async fn summary(&self, since: DateTime<Utc>, top: i64) -> Result<LinkSummary, AppError>;

    /// Round-trips to the store without touching data.
    async fn ping(&self) -> Result<(), AppError>;
}
