//! Rate limiting middleware
//!
//! Per-user token buckets guarding the registration and cancellation
//! endpoints, backed by `governor`'s keyed rate limiter.

use std::num::NonZeroU32;
use std::sync::Arc;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::config::settings::RateLimitConfig;
use crate::utils::errors::{SwingRegistrationsError, Result};

/// Rate limiting middleware
#[derive(Clone, Debug)]
pub struct RateLimitMiddleware {
    limiter: Arc<DefaultKeyedRateLimiter<i64>>,
    staff_exempt: bool,
}

impl RateLimitMiddleware {
    /// Create a new RateLimitMiddleware instance
    pub fn new(config: &RateLimitConfig, staff_exempt: bool) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            SwingRegistrationsError::Config("rate_limit.requests_per_minute must be greater than 0".to_string())
        })?;
        let burst = NonZeroU32::new(config.burst)
            .ok_or_else(|| SwingRegistrationsError::Config("rate_limit.burst must be greater than 0".to_string()))?;

        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            staff_exempt,
        })
    }

    /// Check if user is rate limited
    pub fn check_rate_limit(&self, user_id: i64, is_staff: bool) -> Result<()> {
        if self.staff_exempt && is_staff {
            debug!(user_id = user_id, "Staff user exempt from rate limiting");
            return Ok(());
        }

        match self.limiter.check_key(&user_id) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(user_id = user_id, "Rate limit exceeded");
                Err(SwingRegistrationsError::RateLimitExceeded)
            }
        }
    }

    /// Number of users currently tracked
    pub fn tracked_users(&self) -> usize {
        self.limiter.len()
    }

    /// Forget users whose buckets are full again
    pub fn cleanup_old_entries(&self) {
        self.limiter.retain_recent();
        debug!(remaining_entries = self.limiter.len(), "Cleaned up old rate limit entries");
    }
}
