/*!
 * Retry with linear backoff.
 *
 * The decision of whether and how long to wait is a pure function of the
 * attempt number; the executor performs the waiting through a [`Sleeper`]
 * so tests can run without real delays.
 */

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use parking_lot::Mutex;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then try again
    RetryAfter(Duration),
    /// No attempts left
    GiveUp,
}

/// Up to `max_attempts` attempts, waiting `attempt * backoff_base` after
/// each failed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decision after attempt number `attempt` (1-based) failed
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt < self.max_attempts {
            RetryDecision::RetryAfter(self.backoff_base * attempt)
        } else {
            RetryDecision::GiveUp
        }
    }
}

/// Source of delays between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the Tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

/// Final failure of [`retry_with_backoff`]
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made
    pub attempts: u32,
    /// Error of the last attempt
    pub error: E,
    /// Whether the loop stopped because the error was permanent
    pub permanent: bool,
}

/// Run `operation` until it succeeds, the policy gives up, or it fails
/// with an error `is_retryable` rejects. `operation` receives the 1-based
/// attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !is_retryable(&error) => {
                return Err(RetryFailure {
                    attempts: attempt,
                    error,
                    permanent: true,
                });
            }
            Err(error) => match policy.decide(attempt) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "Attempt {}/{} failed: {} - retrying in {:?}",
                        attempt,
                        policy.max_attempts(),
                        error,
                        delay
                    );
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        error,
                        permanent: false,
                    });
                }
            },
        }
    }
}
