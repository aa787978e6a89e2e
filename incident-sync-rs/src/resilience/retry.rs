//! Retry with exponential backoff for transient failures
//!
//! A logical request is retried only when no response was received or the
//! server answered with a 5xx status. The delay before retry `n` is
//! `initial_interval * multiplier^(n-1)`, which with the defaults gives
//! 2s, 4s and 8s. There is no jitter.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::{Result, SyncError};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means no retries)
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Upper bound for a single delay
    pub max_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_secs(2),
            multiplier: 2.0,
            max_interval: Duration::from_secs(3600),
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_retries: {}, initial_interval: {:?}, multiplier: {}, max_interval: {:?} }}",
            self.max_retries, self.initial_interval, self.multiplier, self.max_interval
        )
    }
}

impl RetryConfig {
    /// A config that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Build a fresh backoff sequence for one logical request
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.0)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(None)
            .build()
    }

    /// The delay applied before each retry, in order
    pub fn schedule(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..self.max_retries)
            .filter_map(|_| backoff.next_backoff())
            .collect()
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    /// Retry configuration
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with the specified configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute a fallible operation with retries according to the configuration.
    ///
    /// The attempt counter and backoff state belong to this call only. When
    /// the budget is exhausted the error of the final attempt is returned
    /// unchanged.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.config.backoff();
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err) && retries < self.config.max_retries => {
                    // max_elapsed_time is unset, so the sequence never ends
                    let delay = backoff
                        .next_backoff()
                        .unwrap_or(self.config.max_interval);

                    retries += 1;
                    log::warn!(
                        "Request failed with retryable error, retrying in {:?} (retry {}/{}): {}",
                        delay,
                        retries,
                        self.config.max_retries,
                        err
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if retries > 0 {
                        log::warn!("Giving up after {} retries: {}", retries, err);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Determine if an error should be retried
    fn should_retry(&self, error: &SyncError) -> bool {
        error.is_retryable()
    }

    /// Get the current retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}
