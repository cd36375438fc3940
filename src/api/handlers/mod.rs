pub mod health;
pub use self::health::health;

pub mod submit;
pub use self::submit::submit;

pub mod rate_limit;

mod utils;

use crate::provider::VerificationProvider;
use axum::http::HeaderMap;
use rate_limit::RateLimiter;
use std::{net::IpAddr, sync::Arc};

/// Shared state handed to the handlers through an `Extension`.
pub struct GatewayState {
    provider: Arc<dyn VerificationProvider>,
    rate_limiter: Arc<dyn RateLimiter>,
    trust_forwarded_for: bool,
}

impl GatewayState {
    #[must_use]
    pub fn new(
        provider: Arc<dyn VerificationProvider>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            trust_forwarded_for: false,
        }
    }

    #[must_use]
    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    #[must_use]
    pub fn provider(&self) -> &dyn VerificationProvider {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    /// Address the rate limiter counts this request against.
    #[must_use]
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> Option<String> {
        utils::client_ip(headers, peer, self.trust_forwarded_for)
    }
}
