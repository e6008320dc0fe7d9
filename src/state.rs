//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RateLimitPolicy, StatsService};
use crate::domain::repositories::{AttemptRepository, LinkRepository};

/// Link service over whichever record store the process was started with.
pub type DynLinkService = LinkService<dyn LinkRepository, dyn AttemptRepository>;

/// Stats service over whichever record store the process was started with.
pub type DynStatsService = StatsService<dyn LinkRepository>;

/// Application state, cheap to clone (all fields are reference counted).
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub auth_service: Arc<AuthService>,
    /// Base for returned short URLs; derived from request headers when unset.
    pub public_base_url: Option<Arc<str>>,
}

impl AppState {
    /// Wires services over the given repositories.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        attempt_repository: Arc<dyn AttemptRepository>,
        auth_service: AuthService,
        policy: RateLimitPolicy,
        max_code_attempts: usize,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(
                link_repository.clone(),
                attempt_repository,
                policy,
                max_code_attempts,
            )),
            stats_service: Arc::new(StatsService::new(link_repository)),
            auth_service: Arc::new(auth_service),
            public_base_url: None,
        }
    }

    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base.map(Arc::from);
        self
    }
}
