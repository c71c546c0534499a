//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

type PeerGovernorLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build(per_second: u64, burst_size: u32) -> PeerGovernorLayer {
    // `finish` only fails on a zero period or burst size.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("non-zero rate limit"),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates a rate limiter for public pages and popup callbacks.
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
/// Rate limits are applied per client IP address extracted from the
/// socket peer address.
pub fn layer() -> PeerGovernorLayer {
    build(2, 100)
}

/// Creates a stricter rate limiter for login submissions.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Each submission may write a profile record.
pub fn secure_layer() -> PeerGovernorLayer {
    build(1, 10)
}
