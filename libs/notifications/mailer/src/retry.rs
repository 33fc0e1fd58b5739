//! Bounded retry with pure exponential backoff.

use crate::error::{MailerError, MailerResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts; 0 and 1 both mean a single attempt
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for each further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Single attempt, no retry
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Number of times the operation may run
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after failed attempt number `attempt` (1-based):
    /// `base_delay * 2^(attempt - 1)`, no jitter and no cap
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    /// Defaults:
    /// - max_attempts: 0
    /// - base_delay: 1000ms
    fn default() -> Self {
        Self::new(0, 1000)
    }
}

/// Run `operation`, retrying retryable failures per `policy`
///
/// Non-retryable errors propagate immediately. Once every attempt is used
/// up the last error is wrapped in [`MailerError::RetryExhausted`]; with a
/// single-attempt policy it propagates as-is.
pub async fn retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> MailerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MailerResult<T>>,
{
    let total = policy.total_attempts();
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Send succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                if attempt >= total {
                    if total == 1 {
                        return Err(e);
                    }
                    return Err(MailerError::RetryExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }

                let delay = policy.delay_for(attempt);
                let remaining = total - attempt;
                warn!(
                    attempt,
                    remaining,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt {} failed: {}. Retrying ({} attempts remaining)",
                    attempt,
                    e,
                    remaining
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
