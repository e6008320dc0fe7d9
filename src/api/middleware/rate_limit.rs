//! Per-IP burst throttle using the token bucket algorithm.
//!
//! This only shields the service from floods. The per-client attempt budget
//! on link mutations is enforced by the rate limiter service.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Throttle layer keyed by `K`.
pub type Throttle<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates the throttle for API endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Use [`PeerIpKeyExtractor`] unless the service runs behind a trusted
/// reverse proxy, in which case [`SmartIpKeyExtractor`] reads forwarding
/// headers. See [`peer_layer`] and [`proxied_layer`].
pub fn layer<K>(key_extractor: K) -> Throttle<K>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(100)
            .key_extractor(key_extractor)
            .finish()
            .expect("governor quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Throttle keyed by the socket peer address.
pub fn peer_layer() -> Throttle<PeerIpKeyExtractor> {
    layer(PeerIpKeyExtractor)
}

/// Throttle keyed by `X-Forwarded-For` / `X-Real-IP`, falling back to the peer.
pub fn proxied_layer() -> Throttle<SmartIpKeyExtractor> {
    layer(SmartIpKeyExtractor)
}
