//! Retry policy implementation

use crate::config::RetryConfig;
use crate::http::Transport;
use crate::pagination::{FetchFailure, FetchResult, Page};
use crate::types::{display_token, BackoffType, ContinuationToken};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Bounded retry with backoff around a single transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per token, first try included
    max_attempts: u32,
    /// Delay before the first retry
    initial_delay: Duration,
    /// Growth of the delay between retries
    backoff: BackoffType,
    /// Optional cap on a single delay
    max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create an exponential, uncapped policy
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            backoff: BackoffType::Exponential,
            max_delay: None,
        }
    }

    /// Create a policy from the retry configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            backoff: config.backoff,
            max_delay: config.max_backoff_ms.map(Duration::from_millis),
        }
    }

    /// Set the backoff type
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType) -> Self {
        self.backoff = backoff;
        self
    }

    /// Cap every delay at `max`
    #[must_use]
    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Attempts per token
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after the failure of attempt `retry + 1`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(retry.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(retry)),
        };

        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Every delay a token can go through before its budget runs out
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts - 1).map(|n| self.delay_for(n)).collect()
    }

    /// Resolve `token` to a page, retrying retryable failures
    ///
    /// Fatal failures return at once. Cancellation is observed before each
    /// attempt and during backoff sleeps; a request already sent is allowed
    /// to complete.
    pub async fn fetch_with_retry(
        &self,
        transport: &dyn Transport,
        token: Option<&ContinuationToken>,
        cancel: &CancellationToken,
    ) -> Result<Page, FetchFailure> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Err(FetchFailure::Cancelled);
            }

            match transport.fetch(token).await {
                FetchResult::Success(page) => {
                    if attempt > 1 {
                        debug!(
                            "Token {} resolved on attempt {}/{}",
                            display_token(token),
                            attempt,
                            self.max_attempts
                        );
                    }
                    return Ok(page);
                }
                FetchResult::FatalFailure(reason) => {
                    return Err(FetchFailure::Fatal { reason });
                }
                FetchResult::RetryableFailure(reason) => {
                    last_reason = reason;
                    if attempt == self.max_attempts {
                        break;
                    }

                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        "Retryable failure for token {}, attempt {}/{}, retrying in {:?}: {}",
                        display_token(token),
                        attempt,
                        self.max_attempts,
                        delay,
                        last_reason
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        Err(FetchFailure::ExhaustedRetries {
            attempts: self.max_attempts,
            last_reason,
        })
    }
}
