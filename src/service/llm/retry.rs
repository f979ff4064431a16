//! Exponential-backoff retry for transient LLM failures

use std::future::Future;
use std::time::Duration;

use super::error::LlmError;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Bounded retry policy: `max_retries` extra attempts after the first,
/// waiting `initial_delay * 2^(k-1)` before retry `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Total number of attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the `retry`-th retry (1-based)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

/// Run `operation` until it succeeds, fails non-transiently, or the policy
/// runs out of attempts.
///
/// The sleep between attempts is a plain `tokio::time::sleep`, so dropping the
/// returned future abandons both the pending delay and any in-flight call.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt = attempt, "LLM call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() => {
                if attempt >= max_attempts {
                    tracing::error!(
                        attempts = attempt,
                        max_retries = policy.max_retries,
                        error = %e,
                        "LLM call failed after exhausting retries"
                    );
                    return Err(LlmError::ExhaustedRetries {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }

                let delay = policy.delay_for_retry(attempt);
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient LLM failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempt = attempt, error = %e, "Non-retryable LLM failure");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records the instant of every attempt and replays scripted results
    struct Script {
        calls: Mutex<Vec<Instant>>,
        results: Mutex<Vec<Result<u32, LlmError>>>,
    }

    impl Script {
        fn new(mut results: Vec<Result<u32, LlmError>>) -> Self {
            results.reverse();
            Self {
                calls: Mutex::new(Vec::new()),
                results: Mutex::new(results),
            }
        }

        async fn call(&self) -> Result<u32, LlmError> {
            self.calls.lock().unwrap().push(Instant::now());
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(LlmError::Transient("HTTP 503: overloaded".to_string())))
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(250));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for_retry(3), Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(4), Duration::from_secs(2));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert!(policy.delay_for_retry(200) >= Duration::from_secs(1 << 30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_transient_makes_n_plus_one_attempts() {
        let script = Script::new(vec![]);
        let policy = RetryPolicy::new(3, Duration::from_secs(1));

        let result = with_retry(&policy, || script.call()).await;

        assert_eq!(script.call_count(), 4);
        match result {
            Err(LlmError::ExhaustedRetries { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(last.is_transient());
            }
            other => panic!("expected exhausted retries, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_exponential() {
        let script = Script::new(vec![]);
        let policy = RetryPolicy::new(3, Duration::from_millis(1500));

        let _ = with_retry(&policy, || script.call()).await;

        assert_eq!(
            script.gaps(),
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(3000),
                Duration::from_millis(6000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_fails_immediately() {
        let script = Script::new(vec![Err(LlmError::Rejected(
            "HTTP 401: authentication_error".to_string(),
        ))]);
        let policy = RetryPolicy::default();

        let result = with_retry(&policy, || script.call()).await;

        assert_eq!(script.call_count(), 1);
        assert!(matches!(result, Err(LlmError::Rejected(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let script = Script::new(vec![
            Err(LlmError::Transient("HTTP 429: rate_limit_error".to_string())),
            Err(LlmError::Transient("connection reset".to_string())),
            Ok(42),
        ]);
        let policy = RetryPolicy::default();

        let result = with_retry(&policy, || script.call()).await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(script.call_count(), 3);
        assert_eq!(
            script.gaps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let script = Script::new(vec![]);
        let policy = RetryPolicy::new(0, Duration::from_secs(1));

        let result = with_retry(&policy, || script.call()).await;

        assert_eq!(script.call_count(), 1);
        assert!(matches!(
            result,
            Err(LlmError::ExhaustedRetries { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_then_rejected_stops() {
        let script = Script::new(vec![
            Err(LlmError::Transient("HTTP 500: api_error".to_string())),
            Err(LlmError::Rejected("HTTP 400: invalid_request_error".to_string())),
        ]);
        let policy = RetryPolicy::default();

        let result = with_retry(&policy, || script.call()).await;

        assert_eq!(script.call_count(), 2);
        assert!(matches!(result, Err(LlmError::Rejected(_))));
    }
}
