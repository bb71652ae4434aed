use std::{future::Future, time::Duration};

use async_trait::async_trait;
use metrics::counter;
use tracing::warn;

use crate::error::UpstreamError;

/// Exponential backoff applied when upstream signals rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero based): doubles each step, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Waits between attempts. Swapped out in tests to avoid real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Runs `call` until it succeeds, fails with something other than rate limiting,
/// or the policy runs out of retries.
pub async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    operation: &'static str,
    mut call: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut retry = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_rate_limited() => return Err(err),
            Err(err) if retry >= policy.max_retries => {
                return Err(UpstreamError::RetriesExhausted {
                    operation,
                    attempts: retry + 1,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.delay_for(retry);
                retry += 1;
                warn!(
                    stage = "upstream",
                    operation,
                    attempt = retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    cause = %err,
                    "rate limited by upstream, retrying"
                );
                counter!("upstream_retries_total", "operation" => operation).increment(1);
                sleeper.sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use employee_facade_core::{ErrorKind, GatewayError};
    use reqwest::StatusCode;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    };

    /// Records requested delays without waiting.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn delays(&self) -> Vec<Duration> {
            self.delays.lock().expect("delays guard").clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().expect("delays guard").push(delay);
        }
    }

    fn rate_limited() -> UpstreamError {
        UpstreamError::Status {
            operation: "list",
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        }
    }

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn delay_doubles_from_initial_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for(2), Duration::from_millis(800));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(4), Duration::from_secs(2));
        assert_eq!(policy.delay_for(40), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn succeeds_on_fourth_attempt_after_three_rate_limits() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleeper::default();
        let attempts = AtomicU32::new(0);
        let calls = &attempts;

        let result = with_backoff(&policy, &sleeper, "list", move || async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= 3 {
                Err(rate_limited())
            } else {
                Ok(attempt)
            }
        })
        .await
        .expect("fourth attempt succeeds");

        assert_eq!(result, 4);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.delays(), ms(&[200, 400, 800]));
    }

    #[tokio::test]
    async fn sustained_rate_limit_stops_after_three_retries() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleeper::default();
        let attempts = AtomicU32::new(0);
        let calls = &attempts;

        let err = with_backoff(&policy, &sleeper, "list", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(rate_limited())
        })
        .await
        .expect_err("retries exhausted");

        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.delays(), ms(&[200, 400, 800]));
        assert!(matches!(
            err,
            UpstreamError::RetriesExhausted { attempts: 4, ref last, .. } if last.is_rate_limited()
        ));
        assert_eq!(GatewayError::from(err).kind(), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleeper::default();
        let attempts = AtomicU32::new(0);
        let calls = &attempts;

        let err = with_backoff(&policy, &sleeper, "list", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(UpstreamError::Status {
                operation: "list",
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            })
        })
        .await
        .expect_err("no retry");

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
        assert_eq!(err.kind(), Some(ErrorKind::Internal));
    }
}
