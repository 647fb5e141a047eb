//! Retry utilities with exponential backoff for resilient API calls.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::FetchError;

/// HTTP status codes that warrant another attempt
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Whether an error is worth retrying
///
/// Connect failures, timeouts and a fixed set of upstream statuses are
/// treated as transient; everything else fails the operation immediately.
pub fn is_transient(error: &FetchError) -> bool {
    match error {
        FetchError::Network(_) | FetchError::Timeout(_) => true,
        FetchError::Api { status, .. } => RETRYABLE_STATUS.contains(status),
        _ => false,
    }
}

/// Execute an async operation, retrying transient failures
///
/// Runs `operation` up to `config.max_attempts` times, sleeping with
/// exponential backoff between attempts. Non-transient errors are
/// returned as-is on first sight; exhausting the attempt budget yields
/// [`FetchError::RetriesExhausted`] carrying the last failure.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempt, "operation succeeded after transient failures");
                }
                return Ok(result);
            }
            Err(error) if !is_transient(&error) => {
                return Err(error);
            }
            Err(error) => {
                if attempt >= config.max_attempts {
                    tracing::warn!(attempt, %error, "giving up after exhausting retries");
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        message: error.to_string(),
                    });
                }

                let delay = config.delay_for_attempt(attempt);
                tracing::debug!(attempt, ?delay, %error, "transient failure, retrying");
                sleep(delay).await;
            }
        }
    }
}
