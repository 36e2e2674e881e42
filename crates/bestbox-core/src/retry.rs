//! Jittered exponential backoff, shared by every crate that retries
//! transient I/O (spec §4.6 Failure semantics, §5 Cancellation and timeouts).

use std::time::Duration;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps the exponential growth).
    pub max_delay: Duration,
    /// Base for exponential backoff.
    pub exponential_base: f64,
    /// Jitter factor in `[0.0, 1.0]`.
    pub jitter_factor: f64,
}

impl RetryConfig {
    /// The runtime's default transient-failure policy (spec §4.6: "max 3
    /// attempts, base 200 ms, cap 4 s").
    #[must_use]
    pub fn runtime_default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(4),
            exponential_base: 2.0,
            jitter_factor: 0.2,
        }
    }

    /// Delay for a given attempt number (0-indexed; attempt 0 has no delay).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_delay_ms =
            self.initial_delay.as_millis() as f64 * self.exponential_base.powi(exponent);
        let capped_delay_ms = base_delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_delay_ms.max(0.0) as u64)
    }

    /// Delay with jitter applied, given a caller-supplied random factor in
    /// `[0.0, 1.0]` (kept as a parameter so callers control the RNG source).
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for_attempt_with_jitter(&self, attempt: u32, random_factor: f64) -> Duration {
        let base_delay = self.delay_for_attempt(attempt);
        if self.jitter_factor <= 0.0 {
            return base_delay;
        }
        let random_factor = random_factor.clamp(0.0, 1.0);
        let jitter_multiplier = 1.0 - self.jitter_factor + (2.0 * self.jitter_factor * random_factor);
        let jittered_ms = base_delay.as_millis() as f64 * jitter_multiplier;
        Duration::from_millis(jittered_ms.max(0.0) as u64)
    }

    /// Whether another attempt is allowed given the current attempt count.
    #[must_use]
    pub fn should_retry(&self, current_attempt: u32) -> bool {
        current_attempt < self.max_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::runtime_default()
    }
}

/// Outcome of a retried operation.
#[derive(Debug, Clone)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded, possibly after retries.
    Success(T),
    /// All attempts were exhausted.
    Exhausted {
        /// The final error.
        error: E,
        /// Total attempts made.
        attempts: u32,
    },
}

/// Run an async operation with retry and jittered exponential backoff.
///
/// `should_retry` inspects the error and decides whether to retry at all;
/// return `false` for non-transient errors to abort immediately.
pub async fn retry<T, E, F, Fut, ShouldRetry>(
    config: &RetryConfig,
    mut should_retry: ShouldRetry,
    mut op: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    ShouldRetry: FnMut(&E) -> bool,
{
    use rand::Rng;

    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return RetryOutcome::Success(value),
            Err(error) => {
                let retryable = should_retry(&error);
                if !retryable || !config.should_retry(attempt) {
                    return RetryOutcome::Exhausted {
                        error,
                        attempts: attempt + 1,
                    };
                }
                let random_factor: f64 = rand::thread_rng().gen_range(0.0..1.0);
                let delay = config.delay_for_attempt_with_jitter(attempt + 1, random_factor);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_and_caps() {
        let cfg = RetryConfig::runtime_default();
        assert_eq!(cfg.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(cfg.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(cfg.delay_for_attempt(2), Duration::from_millis(400));
        assert!(cfg.delay_for_attempt(20) <= cfg.max_delay);
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let cfg = RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            exponential_base: 2.0,
            jitter_factor: 0.0,
        };
        let mut calls = 0;
        let outcome: RetryOutcome<(), &str> = retry(
            &cfg,
            |_err: &&str| true,
            |_attempt| {
                calls += 1;
                async move { Err("boom") }
            },
        )
        .await;
        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 3, .. }));
        assert_eq!(calls, 3);
    }
}
