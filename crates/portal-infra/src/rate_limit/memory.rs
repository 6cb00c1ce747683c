//! Process-local login throttling backed by governor.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use portal_core::ports::{RateLimitDecision, RateLimitError, RateLimiter};

type ClientLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Tracked clients above which idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// `max_requests` attempts per `window`, refilled gradually.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// GCRA quota per client key. Not shared between server instances.
pub struct InMemoryRateLimiter {
    clients: ClientLimiter,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(config.max_requests)
            .ok_or(RateLimitError::InvalidQuota("max_requests must be positive"))?;
        let quota = Quota::with_period(config.window / config.max_requests)
            .ok_or(RateLimitError::InvalidQuota("window must be positive"))?
            .allow_burst(burst);

        Ok(Self {
            clients: GovernorRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, client: &str) -> Result<RateLimitDecision, RateLimitError> {
        if self.clients.len() > PRUNE_THRESHOLD {
            self.clients.retain_recent();
        }

        Ok(match self.clients.check_key(&client.to_owned()) {
            Ok(()) => RateLimitDecision::Allowed,
            Err(not_until) => RateLimitDecision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        })
    }
}
