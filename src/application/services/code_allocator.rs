//! Short code allocation with collision avoidance.

use std::sync::Arc;

use serde_json::json;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_code};

/// Default bound on random generation attempts.
pub const DEFAULT_MAX_ATTEMPTS: usize = 20;

/// Resolves the short code for a new link.
///
/// Allocation only checks availability; it does not reserve anything. The
/// subsequent insert can still lose a race against a concurrent request, in
/// which case the store's uniqueness constraint reports
/// [`AppError::AlreadyExists`].
pub struct CodeAllocator<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    max_attempts: usize,
}

impl<L: LinkRepository + ?Sized> CodeAllocator<L> {
    pub fn new(repository: Arc<L>) -> Self {
        Self::with_max_attempts(repository, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates an allocator that gives up after `max_attempts` random codes.
    ///
    /// A zero bound is raised to one so random allocation always tries once.
    pub fn with_max_attempts(repository: Arc<L>, max_attempts: usize) -> Self {
        Self {
            repository,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns a code that no live link currently uses.
    ///
    /// - `Some(candidate)` is validated against `^[A-Za-z0-9]{3,20}$` and
    ///   checked for existence.
    /// - `None` draws random 6-symbol codes until a free one is found.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidFormat`] if the candidate is malformed
    /// - [`AppError::AlreadyExists`] if the candidate is taken
    /// - [`AppError::AllocationExhausted`] if every random code collided
    /// - [`AppError::StoreUnavailable`] if the existence check failed
    pub async fn allocate(&self, candidate: Option<&str>) -> Result<String, AppError> {
        match candidate {
            Some(code) => self.claim_candidate(code).await,
            None => self.generate_unique().await,
        }
    }

    async fn claim_candidate(&self, code: &str) -> Result<String, AppError> {
        validate_code(code)?;

        if self.repository.find_by_code(code).await?.is_some() {
            return Err(AppError::already_exists(
                "Short code already exists",
                json!({ "code": code, "suggestion": "update" }),
            ));
        }

        Ok(code.to_string())
    }

    async fn generate_unique(&self) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let code = generate_code();

            if self.repository.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }

            metrics::counter!("code_collisions_total").increment(1);
            tracing::debug!(attempt, code = %code, "Generated code collided");
        }

        Err(AppError::allocation_exhausted(
            "Failed to generate unique code",
            json!({ "attempts": self.max_attempts }),
        ))
    }
}
