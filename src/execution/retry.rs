use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// How many times [`retry`] invokes an operation, and how long it waits in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with `max_attempts` attempts and `delay` between them.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy with no pause between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Invoke `op` until it succeeds or `policy.max_attempts` is reached.
///
/// `op` receives the 1-based attempt number. The error of the final attempt is returned
/// unchanged; earlier errors are logged with `tracing::warn!` and discarded.
pub fn retry<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    retry_when(policy, |_| true, op)
}

/// Like [`retry`], but only errors for which `should_retry` returns `true` trigger another
/// attempt. Any other error is returned immediately.
pub fn retry_when<T, E, F, P>(policy: &RetryPolicy, should_retry: P, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= max_attempts || !should_retry(&e) => return Err(e),
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    delay_ms = policy.delay.as_millis() as u64,
                    "attempt failed; retrying"
                );
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
                attempt += 1;
            }
        }
    }
}
