//! Exponential-backoff retry around any fallible remote call.
//!
//! The decision logic — attempt counting, the delay formula, the
//! retryability predicate — lives in [`RetryPolicy`] and is written once.
//! [`run`] and [`run_blocking`] differ only in how they wait: the async
//! runner suspends the task, the blocking runner sleeps the thread.

use std::time::Duration;

use log::warn;
use rand::RngExt;

use crate::error::Error;

/// Attempt-count, delay, and retryability configuration.
///
/// Stateless after construction; share one instance across any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the first re-attempt.
    pub base_delay: Duration,
    /// Upper bound on any computed delay.
    pub max_delay: Duration,
    /// Scale each delay by a random factor in `[0.5, 1.0]` to spread
    /// re-attempts across concurrent callers.
    pub jitter: bool,
    /// Which errors are worth re-attempting.
    pub retryable: fn(&Error) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: true,
            retryable: Error::is_retryable,
        }
    }
}

impl RetryPolicy {
    /// A policy that never re-attempts.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// The un-jittered delay for a 0-based attempt:
    /// `min(base_delay * 2^attempt, max_delay)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }

    /// Decide what to do after a failed 0-based attempt: `Some(delay)` to
    /// wait and go again, `None` to re-raise immediately. No delay is ever
    /// introduced before a terminal failure.
    pub fn next_delay(&self, err: &Error, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts || !(self.retryable)(err) {
            return None;
        }
        let mut delay = self.backoff(attempt);
        if self.jitter {
            let mut rng = rand::rng();
            delay = delay.mul_f64(0.5 + rng.random::<f64>() * 0.5);
        }
        Some(delay)
    }
}

/// Run `op` under `policy`, suspending the task between attempts.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => match policy.next_delay(&err, attempt) {
                Some(delay) => {
                    warn!(
                        "attempt {}/{} failed, retrying in {:.2}s: {}",
                        attempt + 1,
                        policy.max_attempts,
                        delay.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(err),
            },
        }
    }
}

/// Run `op` under `policy`, sleeping the calling thread between attempts.
pub fn run_blocking<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Result<T, Error>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => match policy.next_delay(&err, attempt) {
                Some(delay) => {
                    warn!(
                        "attempt {}/{} failed, retrying in {:.2}s: {}",
                        attempt + 1,
                        policy.max_attempts,
                        delay.as_secs_f64(),
                        err
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                None => return Err(err),
            },
        }
    }
}
