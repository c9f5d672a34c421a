//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: NonZeroU32) -> Arc<Limiter> {
    Arc::new(RateLimiter::direct(Quota::per_second(requests_per_second)))
}

/// Default cap on remote commands per second for one controller
pub const COMMAND_RATE_LIMIT: u32 = 120;

/// Per-connection command limiter. A zero rate disables limiting.
#[derive(Clone)]
pub struct CommandRateLimiter {
    limiter: Option<Arc<Limiter>>,
}

impl CommandRateLimiter {
    pub fn new(commands_per_second: u32) -> Self {
        Self {
            limiter: NonZeroU32::new(commands_per_second).map(create_limiter),
        }
    }

    /// Check if a command is allowed (returns true if allowed)
    pub fn check(&self) -> bool {
        self.limiter
            .as_ref()
            .map_or(true, |limiter| limiter.check().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_disables_limiting() {
        let limiter = CommandRateLimiter::new(0);
        assert!((0..10_000).all(|_| limiter.check()));
    }

    #[test]
    fn burst_beyond_quota_is_rejected() {
        let limiter = CommandRateLimiter::new(3);
        let allowed = (0..10).filter(|_| limiter.check()).count();
        assert_eq!(allowed, 3);
    }
}
