//! Core domain entities.
//!
//! - [`Link`] - A stored short code to target URL mapping
//! - [`NewAttempt`] / [`AttemptWindow`] - Rate-limit bookkeeping per client
//! - [`Caller`] - Who issued a mutating request
//!
//! Creation inputs live in separate structs (`NewLink`, `NewAttempt`) and
//! updates in `LinkPatch`, so persisted fields like `id` and `click_count`
//! are only ever produced by the store.

pub mod attempt;
pub mod caller;
pub mod link;

pub use attempt::{AttemptAction, AttemptWindow, NewAttempt};
pub use caller::Caller;
pub use link::{Creator, Link, LinkPatch, NewLink};
