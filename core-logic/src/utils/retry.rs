use crate::config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Why a countdown retry gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The operation failed with an error the caller does not retry.
    Aborted(E),
    /// Every attempt was used up on retryable errors.
    Exhausted { attempts: u32, last_error: Option<E> },
}

impl RetryConfig {
    /// Wait applied after a retryable failure while `remaining` attempts are
    /// still counted (including the one that just failed).
    pub fn delay_for(&self, remaining: u32) -> Duration {
        Duration::from_millis(u64::from(remaining) * self.step_delay_ms)
    }

    /// Every wait the policy can produce, in the order they happen.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_attempts)
            .rev()
            .map(|remaining| self.delay_for(remaining))
            .collect()
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `config.max_attempts` attempts are spent.
///
/// After each retryable failure the task sleeps `remaining * step_delay_ms`
/// and then decrements the counter. The last attempt is followed by its wait
/// too before `Exhausted` is returned.
pub async fn with_countdown_retry<T, E, F, Fut, R>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    is_retryable: R,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut remaining = config.max_attempts;
    let mut last_error = None;

    while remaining > 0 {
        let attempt = config.max_attempts - remaining + 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                warn!("Error during {}: {}", operation_name, e);

                if !is_retryable(&e) {
                    return Err(RetryError::Aborted(e));
                }

                let delay = config.delay_for(remaining);
                warn!(
                    "Rate limit exceeded (attempt {}/{}). Waiting {:?} before retrying...",
                    attempt, config.max_attempts, delay
                );
                tokio::time::sleep(delay).await;

                remaining -= 1;
                last_error = Some(e);
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: config.max_attempts,
        last_error,
    })
}

/// Textual rate-limit check for errors that only come back as strings.
///
/// This is the one place that knows what a rejected faucet call looks like
/// on the wire; typed callers map through it once and match on variants.
pub fn is_rate_limited(message: &str) -> bool {
    let message = message.to_lowercase();

    let rate_limit_patterns = ["429", "too many requests"];

    rate_limit_patterns
        .iter()
        .any(|pattern| message.contains(pattern))
}
