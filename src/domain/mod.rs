//! Domain layer containing business entities and the record-store contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`attempt_sweeper`] - Background pruning of expired attempt records
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Business rules live in [`crate::application::services`].

pub mod attempt_sweeper;
pub mod entities;
pub mod repositories;
