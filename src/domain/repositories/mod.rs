//! Repository trait definitions for the domain layer.
//!
//! These traits are the record-store interface the service layer consumes.
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated by `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link CRUD, click counting and aggregates
//! - [`AttemptRepository`] - Append-only attempt log for rate limiting

pub mod attempt_repository;
pub mod link_repository;

pub use attempt_repository::AttemptRepository;
pub use link_repository::{LinkRepository, LinkSummary};

#[cfg(test)]
pub use attempt_repository::MockAttemptRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
