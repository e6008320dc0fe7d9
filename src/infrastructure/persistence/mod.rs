//! Record store implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`PgAttemptRepository`] - PostgreSQL via SQLx
//! - [`InMemoryStore`] - process-local maps, both traits in one type
//! - [`Bounded`] - per-call timeout decorator over any of the above

pub mod bounded;
pub mod memory;
pub mod pg_attempt_repository;
pub mod pg_link_repository;

pub use bounded::Bounded;
pub use memory::InMemoryStore;
pub use pg_attempt_repository::PgAttemptRepository;
pub use pg_link_repository::PgLinkRepository;
