//! Bounded retry with exponential backoff and jitter.
//!
//! Retries only transport-level failures, timeouts, 5xx, and 429. Any
//! other outcome ends the loop immediately: success and plain 4xx go back
//! to the caller, auth rejections become a fatal error. The jitter spreads
//! concurrent agent calls so they do not retry in lockstep.

use planwise_core::AgentError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx, or a non-retryable 4xx handed back to the caller
    Success,
    /// Per-attempt timeout expired; the request was cancelled
    Timeout,
    /// Connection-level failure before any status was observed
    Transport,
    /// HTTP 5xx or 429
    ServerError,
    /// HTTP 4xx other than 429
    ClientError,
}

/// Record of one attempt. Ephemeral: drives the retry decision and the
/// log line, nothing else.
#[derive(Debug, Clone)]
pub struct RetryAttempt {
    /// 1-based attempt number
    pub attempt_number: u32,
    /// Elapsed time since the first attempt started
    pub elapsed_ms: u64,
    /// How the attempt ended
    pub outcome: AttemptOutcome,
}

/// What the retry loop should do after an attempt.
pub enum AttemptDecision<T> {
    /// Stop with this value
    Done(T),
    /// Stop with this error; retrying cannot help
    Fatal(AgentError),
    /// Record the failure and try again if budget remains
    Retry {
        /// How the attempt ended
        outcome: AttemptOutcome,
        /// Human-readable failure description, kept for the terminal error
        message: String,
    },
}

/// Retry knobs. Defaults: 3 attempts, 1s base delay doubling per attempt,
/// up to 1s of jitter, 10s per-attempt timeout.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts before the last error is raised
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
    /// Cap on the computed backoff delay
    pub max_delay: Duration,
    /// Upper bound of the uniform random jitter added to each delay
    pub jitter: Duration,
    /// Per-attempt timeout
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `completed + 1`: `base * 2^completed` plus
    /// random jitter, capped at `max_delay`.
    pub fn backoff_delay(&self, completed: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(completed))
            .min(self.max_delay);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return exp;
        }
        exp + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }

    /// Sum of backoff delays without jitter: the floor on total elapsed
    /// time when every attempt fails.
    pub fn total_backoff_floor(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|n| {
                self.base_delay
                    .saturating_mul(2u32.saturating_pow(n))
                    .min(self.max_delay)
            })
            .sum()
    }
}

/// The single retry loop every upstream call goes through.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The configuration this policy runs with.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `attempt_fn` until it succeeds, fails fatally, or the attempt
    /// budget is exhausted. The closure receives the 1-based attempt
    /// number. Sleeps between attempts are non-blocking suspension points.
    pub async fn run<T, F, Fut>(&self, mut attempt_fn: F) -> Result<T, AgentError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptDecision<T>>,
    {
        let started = tokio::time::Instant::now();
        let mut history: Vec<RetryAttempt> = Vec::new();
        let mut last_message = String::new();

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                let delay = self.config.backoff_delay(attempt - 2);
                debug!(attempt, ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            match attempt_fn(attempt).await {
                AttemptDecision::Done(value) => {
                    if attempt > 1 {
                        debug!(attempt, "upstream call recovered after retry");
                    }
                    return Ok(value);
                }
                AttemptDecision::Fatal(err) => {
                    warn!(attempt, error = %err, "upstream call failed fatally");
                    return Err(err);
                }
                AttemptDecision::Retry { outcome, message } => {
                    debug!(attempt, ?outcome, %message, "attempt failed");
                    history.push(RetryAttempt {
                        attempt_number: attempt,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        outcome,
                    });
                    last_message = message;
                }
            }
        }

        warn!(
            attempts = history.len(),
            %last_message,
            "retry budget exhausted"
        );
        Err(AgentError::UpstreamTransport(format!(
            "{} attempts exhausted: {last_message}",
            self.config.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter: Duration::ZERO,
            attempt_timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(fast_config());

        let result = policy
            .run(|_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { AttemptDecision::Done(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_makes_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(fast_config());
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run(|_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    AttemptDecision::Retry {
                        outcome: AttemptOutcome::ServerError,
                        message: "HTTP 500".to_string(),
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(AgentError::UpstreamTransport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff, at minimum.
        assert!(started.elapsed() >= policy.config().total_backoff_floor());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(fast_config());

        let result: Result<(), _> = policy
            .run(|_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { AttemptDecision::Fatal(AgentError::UpstreamAuth("401".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(AgentError::UpstreamAuth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_after_one_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(fast_config());

        let result = policy
            .run(|attempt| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        AttemptDecision::Retry {
                            outcome: AttemptOutcome::Timeout,
                            message: "timed out".to_string(),
                        }
                    } else {
                        AttemptDecision::Done("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig {
            jitter: Duration::ZERO,
            ..fast_config()
        };
        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(10), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_under_bound() {
        let config = RetryConfig {
            jitter: Duration::from_millis(500),
            ..fast_config()
        };
        for _ in 0..50 {
            let delay = config.backoff_delay(0);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay < Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_total_backoff_floor() {
        assert_eq!(fast_config().total_backoff_floor(), Duration::from_secs(3));
    }
}
