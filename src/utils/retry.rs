use crate::utils::error::ModelError;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff for transient model failures.
///
/// Attempt n sleeps `base_delay * 2^(n-1)` before trying again. Only
/// errors where [`ModelError::is_retryable`] holds are retried; everything
/// else surfaces immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries. Matches the original chain's behavior.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

pub async fn run_with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    label: &str,
    mut call: F,
) -> std::result::Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, ModelError>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} attempt {}/{} failed ({}), retrying in {:?}",
                    label,
                    attempt,
                    policy.max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
