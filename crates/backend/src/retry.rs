//! Fixed-delay retry policy for Steam fetches
//!
//! Sleeps through `tokio::time`, so tests run it under a paused clock.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between attempts, never grows
    pub delay: Duration,
    /// `None` retries until success
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    pub fn forever(delay: Duration) -> Self {
        Self { delay, max_attempts: None }
    }

    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts: Some(max_attempts.max(1)) }
    }

    /// Run `op` until it succeeds, it fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        mut op: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "{} succeeded after retrying", label);
                    }
                    return Ok(value);
                }
                Err(e) if !retryable(&e) => return Err(e),
                Err(e) => {
                    if self.max_attempts.is_some_and(|max| attempt >= max) {
                        tracing::error!(attempt, "{} failed, giving up: {}", label, e);
                        return Err(e);
                    }
                    tracing::warn!(
                        attempt,
                        delay_secs = self.delay.as_secs(),
                        "{} failed, retrying: {}",
                        label,
                        e
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
