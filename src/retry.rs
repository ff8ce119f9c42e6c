//! Attempt counting with exponential backoff

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How many times to try an operation and how long to wait in between.
///
/// After failed attempt `n` the policy sleeps `backoff_factor ^ n` seconds
/// before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff_factor: f64) -> Self {
        Self {
            attempts,
            backoff_factor,
        }
    }

    /// Delay before the attempt following failed attempt `attempt`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor.max(0.0).powi(attempt as i32);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Run `op` until it succeeds, fails with an error `is_recoverable`
    /// rejects, or the attempts run out. `op` receives the 1-based attempt
    /// number. The last error is returned on failure.
    pub async fn run<T, E, F, Fut, P>(&self, label: &str, mut op: F, is_recoverable: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_recoverable(&err) || attempt >= attempts {
                return Err(err);
            }

            let delay = self.delay_after(attempt);
            warn!(
                "{} failed (attempt {}/{}): {}. Retrying in {:.1}s",
                label,
                attempt,
                attempts,
                err,
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn test_delay_is_exponential() {
        let policy = RetryPolicy::new(3, 2.0);
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(RetryPolicy::new(3, 0.0).delay_after(1), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = Cell::new(0);
        let started = Instant::now();

        let result: Result<u32, String> = RetryPolicy::new(3, 2.0)
            .run(
                "op",
                |attempt| {
                    calls.set(calls.get() + 1);
                    async move {
                        if attempt < 3 {
                            Err(format!("boom {attempt}"))
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
        // 2s after the first failure, 4s after the second
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_last_attempt() {
        let calls = Cell::new(0);
        let result: Result<(), &str> = RetryPolicy::new(3, 1.0)
            .run(
                "op",
                |_| {
                    calls.set(calls.get() + 1);
                    async { Err("down") }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("down"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecoverable_error_stops_immediately() {
        let calls = Cell::new(0);
        let started = Instant::now();
        let result: Result<(), &str> = RetryPolicy::new(5, 2.0)
            .run(
                "op",
                |_| {
                    calls.set(calls.get() + 1);
                    async { Err("fatal") }
                },
                |err| *err != "fatal",
            )
            .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
