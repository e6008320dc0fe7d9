//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::code_allocator::CodeAllocator`] - Unique short code resolution
//! - [`services::rate_limiter::RateLimiter`] - Sliding-window client limit
//! - [`services::link_service::LinkService`] - Link create/rebind/redirect/admin flow
//! - [`services::stats_service::StatsService`] - Aggregate link statistics
//! - [`services::auth_service::AuthService`] - Admin bearer-token verification

pub mod services;
