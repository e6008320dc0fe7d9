//! HTTP middleware for request processing and protection.
//!
//! Provides caller authentication, burst throttling, and request tracing.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
