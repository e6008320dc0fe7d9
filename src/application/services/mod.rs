//! Business logic services for the application layer.

pub mod auth_service;
pub mod code_allocator;
pub mod link_service;
pub mod rate_limiter;
pub mod stats_service;

pub use auth_service::AuthService;
pub use code_allocator::CodeAllocator;
pub use link_service::{LinkPage, LinkService};
pub use rate_limiter::{RateDecision, RateLimitPolicy, RateLimiter};
pub use stats_service::{StatsService, StatsSummary};
