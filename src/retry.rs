//! Bounded retry with a fixed or exponential delay between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How the delay grows between attempts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed,
    /// Delay doubles after every retry
    Exponential,
}

/// Retry policy shared by anything that talks to a flaky external process.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Delay growth
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// A policy that sleeps `delay` between each of `max_attempts` attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// A policy whose delay doubles after every failed attempt.
    pub fn exponential(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Delay slept after the given (zero-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => self.delay.saturating_mul(2u32.saturating_pow(attempt)),
        }
    }

    /// Runs `op` until it succeeds, returns an error `should_retry` rejects,
    /// or the attempts run out. The last error is returned in the latter cases.
    pub async fn run<T, E, F, Fut, P>(&self, should_retry: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        "Attempt {attempt}/{attempts} failed ({err}), retrying in {}s",
                        delay.as_secs_f32()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
