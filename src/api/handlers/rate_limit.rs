//! Rate limiting primitives for the submission endpoint.
//!
//! Flow Overview:
//! 1) Each client address owns a fixed window that opens on its first request.
//! 2) Up to `limit` requests are allowed while the window is open.
//! 3) The window resets `window` after it opened; the count starts over.
//!
//! Several windows can be stacked (a per-minute burst cap under an hourly
//! cap); a request is refused by the first window that is exhausted.
//!
//! State lives in process memory; a single gateway instance is assumed.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_HOURLY_LIMIT: u32 = 100;
pub const HOURLY_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Requests without a resolvable address share this bucket.
const UNKNOWN_CLIENT: &str = "unknown";
/// Expired windows are swept once the map grows past this size.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

#[derive(Clone, Copy, Debug)]
struct Window {
    opened_at: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowRateLimiter {
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count one request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        // A poisoned lock only means another request panicked mid-update; the
        // counters are still usable.
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() > SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, entry| now.saturating_duration_since(entry.opened_at) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            opened_at: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.opened_at) >= self.window {
            *entry = Window {
                opened_at: now,
                count: 0,
            };
        }

        if entry.count >= self.limit {
            RateLimitDecision::Limited
        } else {
            entry.count += 1;
            RateLimitDecision::Allowed
        }
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check_ip(&self, ip: Option<&str>) -> RateLimitDecision {
        self.check_at(ip.unwrap_or(UNKNOWN_CLIENT), Instant::now())
    }
}

/// Limiters applied in order; later ones are not counted once one refuses.
pub struct StackedRateLimiter {
    limiters: Vec<Arc<dyn RateLimiter>>,
}

impl StackedRateLimiter {
    #[must_use]
    pub fn new(limiters: Vec<Arc<dyn RateLimiter>>) -> Self {
        Self { limiters }
    }
}

impl RateLimiter for StackedRateLimiter {
    fn check_ip(&self, ip: Option<&str>) -> RateLimitDecision {
        if self
            .limiters
            .iter()
            .all(|limiter| limiter.check_ip(ip) == RateLimitDecision::Allowed)
        {
            RateLimitDecision::Allowed
        } else {
            RateLimitDecision::Limited
        }
    }
}
