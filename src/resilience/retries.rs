//! Bounded polling with a fixed backoff.
//!
//! # Responsibilities
//! - Run a check until it yields a value or the attempt budget is spent
//! - Sleep a fixed interval between attempts
//!
//! # Design Decisions
//! - Exhaustion is not an error; callers get `None` and decide what to log
//! - No sleep after the final attempt

use std::future::Future;
use std::time::Duration;

use crate::config::DiscoveryConfig;

/// Retry budget for a polled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl From<&DiscoveryConfig> for RetryPolicy {
    fn from(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.retry_interval_secs),
        )
    }
}

/// Call `check` with the 1-based attempt number until it returns `Some`.
pub async fn retry_until_some<T, F, Fut>(policy: RetryPolicy, mut check: F) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=policy.max_attempts {
        if let Some(value) = check(attempt).await {
            return Some(value);
        }

        if attempt < policy.max_attempts {
            tracing::debug!(
                attempt,
                max_attempts = policy.max_attempts,
                wait_secs = policy.interval.as_secs_f64(),
                "Attempt came up empty, waiting before retry"
            );
            tokio::time::sleep(policy.interval).await;
        }
    }

    None
}
