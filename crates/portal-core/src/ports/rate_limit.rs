//! Throttling of repeated attempts from one client.

use std::time::Duration;

use async_trait::async_trait;

/// Outcome of recording one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Quota spent; the client may retry after the given delay.
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one attempt from `client`, usually the caller's IP address.
    async fn check(&self, client: &str) -> Result<RateLimitDecision, RateLimitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("invalid quota: {0}")]
    InvalidQuota(&'static str),

    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}
