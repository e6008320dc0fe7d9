//! Link creation, rebinding, redirect resolution and administration.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::code_allocator::CodeAllocator;
use super::rate_limiter::{RateLimitPolicy, RateLimiter};
use crate::domain::entities::{AttemptAction, Caller, Link, LinkPatch, NewLink};
use crate::domain::repositories::{AttemptRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::code_generator::is_valid_code;
use crate::utils::url_validator::validate_target_url;

/// How often an insert of a freshly generated code may lose a race before
/// creation gives up.
const INSERT_RACE_RETRIES: usize = 3;

/// One page of links for the admin listing.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<Link>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

/// Orchestrates the mutating link flow:
///
/// 1. Rate limit check (skipped for admin callers)
/// 2. URL validation
/// 3. Code allocation or lookup
/// 4. Store insert/update
/// 5. Attempt recording (best effort, clients only)
///
/// Failed operations do not consume the client's budget because the attempt
/// is only recorded after the store accepted the change.
pub struct LinkService<L: LinkRepository + ?Sized, A: AttemptRepository + ?Sized> {
    link_repository: Arc<L>,
    allocator: CodeAllocator<L>,
    rate_limiter: RateLimiter<A>,
}

impl<L, A> LinkService<L, A>
where
    L: LinkRepository + ?Sized,
    A: AttemptRepository + ?Sized,
{
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        attempt_repository: Arc<A>,
        policy: RateLimitPolicy,
        max_code_attempts: usize,
    ) -> Self {
        Self {
            allocator: CodeAllocator::with_max_attempts(link_repository.clone(), max_code_attempts),
            rate_limiter: RateLimiter::new(attempt_repository, policy),
            link_repository,
        }
    }

    pub fn rate_limiter(&self) -> &RateLimiter<A> {
        &self.rate_limiter
    }

    /// Creates a short link.
    ///
    /// # Errors
    ///
    /// - [`AppError::RateLimited`] if the client's window is full
    /// - [`AppError::InvalidFormat`] for a malformed URL or custom code
    /// - [`AppError::AlreadyExists`] if the custom code is taken
    /// - [`AppError::AllocationExhausted`] if no free random code was found
    /// - [`AppError::StoreUnavailable`] on store failures
    pub async fn create_link(
        &self,
        target_url: &str,
        custom_code: Option<&str>,
        caller: &Caller,
    ) -> Result<Link, AppError> {
        let now = Utc::now();

        self.rate_limiter
            .check(caller.client_id(), now)
            .await?
            .into_result()?;

        let target_url = validate_target_url(target_url).map_err(|e| {
            AppError::invalid_format("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let new_link = |code: String| NewLink {
            code,
            target_url: target_url.clone(),
            created_by: caller.creator(),
            owner_client_id: caller.client_id().map(str::to_string),
            created_at: now,
        };

        let link = match custom_code {
            Some(candidate) => {
                let code = self.allocator.allocate(Some(candidate)).await?;
                self.link_repository.insert(new_link(code)).await?
            }
            None => self.insert_generated(new_link).await?,
        };

        self.rate_limiter
            .record(caller.client_id(), AttemptAction::Create, now)
            .await;

        metrics::counter!("links_created_total", "created_by" => caller.creator().as_str())
            .increment(1);
        tracing::info!(code = %link.code, created_by = %link.created_by, "Link created");

        Ok(link)
    }

    /// Inserts under a random code, drawing a new one when a concurrent
    /// request claimed the same code between the check and the insert.
    async fn insert_generated<F>(&self, new_link: F) -> Result<Link, AppError>
    where
        F: Fn(String) -> NewLink,
    {
        for _ in 0..INSERT_RACE_RETRIES {
            let code = self.allocator.allocate(None).await?;

            match self.link_repository.insert(new_link(code)).await {
                Err(AppError::AlreadyExists { details, .. }) => {
                    tracing::debug!(%details, "Generated code lost insert race");
                    continue;
                }
                other => return other,
            }
        }

        Err(AppError::allocation_exhausted(
            "Failed to generate unique code",
            json!({ "reason": "Repeated insert conflicts" }),
        ))
    }

    /// Points an existing code at a new target URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::RateLimited`] if the client's window is full
    /// - [`AppError::NotFound`] if no link has `code`
    /// - [`AppError::InvalidFormat`] if `new_url` is malformed; the stored
    ///   link is left untouched
    pub async fn rebind(&self, code: &str, new_url: &str, caller: &Caller) -> Result<Link, AppError> {
        let now = Utc::now();

        self.rate_limiter
            .check(caller.client_id(), now)
            .await?
            .into_result()?;

        if !is_valid_code(code) || self.link_repository.find_by_code(code).await?.is_none() {
            return Err(Self::missing(code));
        }

        let target_url = validate_target_url(new_url).map_err(|e| {
            AppError::invalid_format("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let link = self
            .link_repository
            .update(
                code,
                LinkPatch {
                    target_url,
                    updated_at: now,
                },
            )
            .await?;

        self.rate_limiter
            .record(caller.client_id(), AttemptAction::Update, now)
            .await;

        metrics::counter!("links_rebound_total").increment(1);
        tracing::info!(code, "Link rebound");

        Ok(link)
    }

    /// Resolves a code for redirect, counting the click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has `code`.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        if !is_valid_code(code) {
            return Err(Self::missing(code));
        }

        let link = self
            .link_repository
            .record_click(code, Utc::now())
            .await?
            .ok_or_else(|| Self::missing(code))?;

        metrics::counter!("redirects_total").increment(1);

        Ok(link)
    }

    /// Fetches a link without touching its counters.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| Self::missing(code))
    }

    /// Lists links newest first.
    ///
    /// `page` is 1-indexed; callers validate bounds.
    pub async fn list_links(&self, page: u32, page_size: u32) -> Result<LinkPage, AppError> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let offset = i64::from(page - 1) * i64::from(page_size);

        let (items, total) = self
            .link_repository
            .list(offset, i64::from(page_size))
            .await?;

        let size = i64::from(page_size);
        let total_pages = (total + size - 1) / size;

        Ok(LinkPage {
            items,
            total,
            page,
            page_size,
            total_pages,
        })
    }

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has `code`.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        self.link_repository.delete(code).await?;
        tracing::info!(code, "Link deleted");
        Ok(())
    }

    /// Verifies the record store is reachable.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }

    fn missing(code: &str) -> AppError {
        AppError::not_found(
            "Short link not found",
            json!({ "code": code, "suggestion": "create" }),
        )
    }
}
