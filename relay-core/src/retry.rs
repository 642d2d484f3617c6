//! Bounded retry policy
//!
//! The remote system offers no push notification for "run listed" or "run
//! completed", so both are polled. Each attempt decides for itself whether
//! a failure is worth another try; the policy only owns the timing.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay between attempts when nothing else is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Total time budget when nothing else is configured
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(10 * 60);

/// Outcome of a single attempt
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// The attempt succeeded
    Ready(T),
    /// Transient failure, try again after the interval
    Retry(E),
    /// Permanent failure, stop now
    Fatal(E),
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("{0}")]
    Fatal(E),

    /// The budget ran out. `last` is the final retryable failure, `None`
    /// when the final attempt was still in flight.
    #[error("gave up after {attempts} attempt(s) in {elapsed:?}")]
    Exhausted {
        attempts: u32,
        elapsed: Duration,
        last: Option<E>,
    },

    #[error("cancelled")]
    Cancelled,
}

/// Constant-interval backoff bounded by total elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    interval: Duration,
    max_elapsed: Duration,
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_elapsed: Duration) -> Self {
        Self {
            interval,
            max_elapsed,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_elapsed(&self) -> Duration {
        self.max_elapsed
    }

    /// Runs `op` until it is ready, fails fatally, or the budget runs out
    ///
    /// Every attempt and every sleep between attempts is raced against
    /// `shutdown`. The last sleep is shortened so it ends when the budget
    /// does; one final attempt then runs before giving up. An attempt may
    /// take the remaining budget but never less than one interval, so the
    /// policy returns between `max_elapsed` and `max_elapsed + interval`
    /// after the start even when an attempt never resolves.
    pub async fn run<T, E, F, Fut>(
        &self,
        shutdown: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let allowed = self
                .max_elapsed
                .saturating_sub(start.elapsed())
                .max(self.interval);

            let last = match shutdown
                .run_until_cancelled(tokio::time::timeout(allowed, op()))
                .await
            {
                None => return Err(RetryError::Cancelled),
                Some(Err(_)) => {
                    let elapsed = start.elapsed();
                    warn!(
                        attempt = attempts,
                        ?elapsed,
                        "Attempt did not finish within the budget"
                    );
                    return Err(RetryError::Exhausted {
                        attempts,
                        elapsed,
                        last: None,
                    });
                }
                Some(Ok(Attempt::Ready(value))) => return Ok(value),
                Some(Ok(Attempt::Fatal(err))) => return Err(RetryError::Fatal(err)),
                Some(Ok(Attempt::Retry(err))) => err,
            };

            let elapsed = start.elapsed();
            if elapsed >= self.max_elapsed {
                return Err(RetryError::Exhausted {
                    attempts,
                    elapsed,
                    last: Some(last),
                });
            }

            let delay = self.interval.min(self.max_elapsed - elapsed);
            debug!(attempt = attempts, ?delay, "Attempt not ready, retrying");

            if shutdown
                .run_until_cancelled(tokio::time::sleep(delay))
                .await
                .is_none()
            {
                return Err(RetryError::Cancelled);
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_MAX_ELAPSED)
    }
}
