//! Failure policy for sync calls
//!
//! [`SyncPolicy`] decides whether a push or pull is attempted once or
//! retried with exponential backoff. Only errors that report themselves as
//! transient are retried; a rejected login is never resent.
//!
//! ```ignore
//! let policy = SyncPolicy::RetryWithBackoff(
//!     RetryConfig::new()
//!         .with_max_attempts(3)
//!         .with_base_delay(Duration::from_millis(100)),
//! );
//! let client = SyncClient::new(ClientConfig::new(base_url).with_sync_policy(policy))?;
//! ```

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;

/// Errors that know whether resending the request could succeed.
pub trait RetryableError {
    fn is_retryable(&self) -> bool;
}

impl RetryableError for crate::ClientError {
    fn is_retryable(&self) -> bool {
        crate::ClientError::is_retryable(self)
    }
}

/// Backoff settings for [`SyncPolicy::RetryWithBackoff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each later one
    pub base_delay: Duration,
    /// Upper bound for a single delay, before jitter
    pub max_delay: Duration,
    /// Spread retries by up to a quarter of the delay
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, enable: bool) -> Self {
        self.add_jitter = enable;
        self
    }

    /// Delay before retry number `retry` (zero-based)
    #[must_use]
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if self.add_jitter {
            delay + jitter(delay / 4)
        } else {
            delay
        }
    }
}

/// Up to `range`, seeded from the clock; only needs to decorrelate clients.
fn jitter(range: Duration) -> Duration {
    let range_ns = range.as_nanos() as u64;
    if range_ns == 0 {
        return Duration::ZERO;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    Duration::from_nanos(seed % range_ns)
}

/// How sync calls react to failure.
///
/// The server stays authoritative under either policy; retrying only
/// shortens the window in which the local cache disagrees with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Single attempt; failures are logged and dropped
    #[default]
    BestEffort,
    /// Retry transient failures with exponential backoff
    RetryWithBackoff(RetryConfig),
}

impl SyncPolicy {
    /// Run `operation` under this policy, naming it `call` in logs
    pub async fn run<F, Fut, T, E>(&self, call: &'static str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let config = match self {
            Self::BestEffort => return operation().await,
            Self::RetryWithBackoff(config) => config,
        };

        let mut retry = 0;
        loop {
            match operation().await {
                Err(err) if err.is_retryable() && retry < config.max_attempts => {
                    let delay = config.delay_for_attempt(retry);
                    retry += 1;
                    tracing::warn!(
                        call,
                        retry,
                        max_retries = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient sync failure, retrying"
                    );
                    sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// Maximum number of attempts, including the first
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::BestEffort => 1,
            Self::RetryWithBackoff(config) => config.max_attempts.saturating_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Flaky {
        retryable: bool,
    }

    impl std::fmt::Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("flaky")
        }
    }

    impl RetryableError for Flaky {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    fn fast(retries: u32) -> SyncPolicy {
        SyncPolicy::RetryWithBackoff(
            RetryConfig::new()
                .with_max_attempts(retries)
                .with_base_delay(Duration::from_millis(1))
                .with_jitter(false),
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(500))
            .with_jitter(false);

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(40), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_stays_within_a_quarter() {
        let config = RetryConfig::new().with_base_delay(Duration::from_millis(400));
        let delay = config.delay_for_attempt(0);
        assert!(delay >= Duration::from_millis(400));
        assert!(delay < Duration::from_millis(500));
    }

    #[test]
    fn test_max_attempts() {
        assert_eq!(SyncPolicy::BestEffort.max_attempts(), 1);
        assert_eq!(fast(2).max_attempts(), 3);
    }

    #[tokio::test]
    async fn test_best_effort_single_attempt() {
        let calls = Cell::new(0);
        let result = SyncPolicy::BestEffort
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(Flaky { retryable: true }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_backoff_recovers_from_transient_failure() {
        let calls = Cell::new(0);
        let result = fast(2)
            .run("test", || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt < 2 {
                        Err(Flaky { retryable: true })
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_backoff_gives_up_after_limit() {
        let calls = Cell::new(0);
        let result = fast(2)
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(Flaky { retryable: true }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_backoff_skips_permanent_errors() {
        let calls = Cell::new(0);
        let result = fast(5)
            .run("test", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(Flaky { retryable: false }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
