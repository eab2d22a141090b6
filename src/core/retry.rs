//! Exponential backoff with jitter
//!
//! Retry policy applied around directory calls. Only throttling errors are
//! retried; every other error propagates immediately. The jitter term keeps
//! concurrent invocations from retrying in lockstep.

use crate::config::RetrySettings;
use crate::domain::DirectoryError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Retry configuration for throttled directory calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts before giving up
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent attempt
    pub base_delay: Duration,

    /// Upper bound on the computed (pre-jitter) delay
    pub max_delay: Duration,

    /// Uniform jitter fraction applied to each computed delay
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 8,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from configuration settings.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            jitter: settings.jitter,
        }
    }

    /// Pre-jitter backoff delay for a retry attempt (0-based).
    ///
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (base_ms * 2f64.powi(attempt as i32)).min(max_ms);
        Duration::from_millis(delay_ms as u64)
    }

    /// Backoff delay with the jitter term applied, clamped to >= 0.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.backoff_delay(attempt);
        if self.jitter <= 0.0 {
            return delay;
        }

        let delay_ms = delay.as_millis() as f64;
        let spread = self.jitter * delay_ms;
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_millis((delay_ms + offset).max(0.0) as u64)
    }

    /// Runs `op`, retrying throttling errors with exponential backoff.
    ///
    /// Non-throttling errors propagate immediately. Exhausting the retry
    /// budget converts the throttling error into
    /// [`DirectoryError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, DirectoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_throttling() => {
                    if attempt >= self.max_retries {
                        tracing::error!(
                            attempts = attempt,
                            error = %err,
                            "Maximum retries exceeded"
                        );
                        return Err(DirectoryError::RetriesExhausted {
                            attempts: attempt,
                            message: err.to_string(),
                        });
                    }

                    let delay = self.jittered_delay(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
