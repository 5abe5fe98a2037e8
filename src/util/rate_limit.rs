//! Rate limiting for action submissions

use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default action submissions allowed per session per second
pub const SUBMIT_RATE_LIMIT: u32 = 5;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// One submission limiter per session token, created on first use
pub struct SessionRateLimiter {
    per_second: u32,
    limiters: DashMap<Uuid, Arc<Limiter>>,
}

impl SessionRateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            per_second,
            limiters: DashMap::new(),
        }
    }

    /// Check if a submission is allowed (returns true if allowed)
    pub fn check(&self, session: &Uuid) -> bool {
        let limiter = self
            .limiters
            .entry(*session)
            .or_insert_with(|| create_limiter(self.per_second))
            .clone();
        limiter.check().is_ok()
    }

    /// Forget the limiter of a revoked session
    pub fn remove(&self, session: &Uuid) {
        self.limiters.remove(session);
    }

    /// Sessions currently holding a limiter
    pub fn tracked(&self) -> usize {
        self.limiters.len()
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::new(SUBMIT_RATE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_capped_per_session() {
        let limiter = SessionRateLimiter::new(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(limiter.check(&a));
        assert!(limiter.check(&a));
        assert!(!limiter.check(&a));
        assert!(limiter.check(&b));
    }

    #[test]
    fn removed_session_starts_fresh() {
        let limiter = SessionRateLimiter::new(1);
        let a = Uuid::new_v4();
        assert!(limiter.check(&a));
        assert!(!limiter.check(&a));
        assert_eq!(limiter.tracked(), 1);

        limiter.remove(&a);
        assert_eq!(limiter.tracked(), 0);
        assert!(limiter.check(&a));
    }
}
