//! Retry policy for operations that must survive transient API errors.
//!
//! [`Backoff`] is a plain value: the delay for attempt `n` is
//! `first × factor^n`, clamped to `max`. [`Backoff::retry`] drives an async
//! operation under the policy and stops early when the cancellation token
//! fires.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use time::ext::NumericalStdDuration as _;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    /// Total number of attempts, the first one included.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    /// Multiplicative growth factor, `1.0` keeps the delay constant.
    pub factor: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("giving up after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    #[error("retry canceled")]
    Canceled,
}

impl Default for Backoff {
    /// Five attempts, one second apart.
    fn default() -> Self {
        Self::constant(1.std_seconds(), 5)
    }
}

impl Backoff {
    pub fn constant(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            first: delay,
            max: delay,
            factor: 1.0,
        }
    }

    pub fn exponential(first: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            first,
            max,
            factor: 2.0,
        }
    }

    /// Delay to wait after the failed attempt `attempt` (0-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Runs `op` until it succeeds, attempts run out or `token` is cancelled.
    ///
    /// No delay follows the last attempt. Its error is returned inside
    /// [`RetryError::Exhausted`]. A policy with `max_attempts == 0` still
    /// makes one attempt.
    pub async fn retry<T, E, F, Fut>(
        &self,
        token: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if token.is_cancelled() {
                return Err(RetryError::Canceled);
            }
            let Some(result) = token.run_until_cancelled(op()).await else {
                return Err(RetryError::Canceled);
            };
            attempt += 1;

            let err = match result {
                Ok(value) => return Ok(value),
                Err(source) if attempt >= max_attempts => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => err,
            };

            let delay = self.delay(attempt - 1);
            tracing::warn!(attempt, max_attempts, %err, ?delay, "Attempt failed, retrying");
            if token
                .run_until_cancelled(tokio::time::sleep(delay))
                .await
                .is_none()
            {
                return Err(RetryError::Canceled);
            }
        }
    }
}
