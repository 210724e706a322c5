// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Bounded retry with exponential backoff.
//!
//! [`with_retry`] runs an async operation until it succeeds, fails with an
//! error classified as permanent, or runs out of attempts. The outcome is
//! tagged so callers can tell the two failure modes apart.
//!
//! # Examples
//!
//! ```
//! use promptsmith::retry::{classify_error, with_retry, RetryOutcome, RetryPolicy};
//! use promptsmith::Error;
//!
//! # tokio_test_block(async {
//! let policy = RetryPolicy::new().with_max_attempts(1);
//! let outcome = with_retry(&policy, classify_error, |_| async {
//!     Err::<(), _>(Error::generation("invalid API key"))
//! })
//! .await;
//! assert!(matches!(outcome, RetryOutcome::PermanentFailure(_)));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f);
//! # }
//! ```

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Retry behavior for generation calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// Create default policy: 5 attempts, 2s base delay doubling, 60s cap.
    pub const fn new() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Policy that never retries.
    pub const fn none() -> Self {
        Self::new().with_max_attempts(1)
    }

    /// Set total attempts.
    pub const fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set base delay.
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set backoff factor.
    pub const fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set maximum delay.
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay after the given failed attempt (1-based): `base * factor^(attempt-1)`, capped.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        let capped = secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }

    /// Check the policy is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("retry policy needs at least one attempt"));
        }
        if !(self.backoff_factor >= 1.0 && self.backoff_factor.is_finite()) {
            return Err(Error::config(format!(
                "backoff factor must be at least 1, got {}",
                self.backoff_factor
            )));
        }
        Ok(())
    }
}

/// How a failed call should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Provider asked us to slow down (HTTP 429).
    RateLimited,
    /// Network trouble or a timeout.
    Transient,
    /// Anything else. Not retried.
    Permanent,
}

impl ErrorClass {
    /// Whether the call should be attempted again.
    #[inline]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }
}

const RATE_LIMIT_MARKERS: &[&str] = &["429", "too many requests", "rate limit"];

const TRANSIENT_MARKERS: &[&str] = &[
    "httpsconnectionpool",
    "connectionerror",
    "connecttimeout",
    "read timed out",
    "max retries exceeded",
    "timed out",
    "timeout",
    "connection reset",
    "connection refused",
    "connection closed",
    "bad gateway",
    "service unavailable",
    "overloaded",
];

/// Classify an error by its message.
pub fn classify_error(error: &Error) -> ErrorClass {
    match error {
        Error::Timeout(_) => ErrorClass::Transient,
        Error::Generation(_) | Error::Io(_) | Error::Other(_) => {
            let msg = error.to_string().to_lowercase();
            if RATE_LIMIT_MARKERS.iter().any(|m| msg.contains(m)) {
                ErrorClass::RateLimited
            } else if TRANSIENT_MARKERS.iter().any(|m| msg.contains(m)) {
                ErrorClass::Transient
            } else {
                ErrorClass::Permanent
            }
        }
        _ => ErrorClass::Permanent,
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// The operation succeeded.
    Success(T),
    /// Every attempt failed with a retryable error.
    ExhaustedRetries {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last_error: Error,
    },
    /// An attempt failed with a non-retryable error.
    PermanentFailure(Error),
}

impl<T> RetryOutcome<T> {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The value, if the operation succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to a plain result.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(v) => Ok(v),
            Self::ExhaustedRetries { last_error, .. } => Err(last_error),
            Self::PermanentFailure(e) => Err(e),
        }
    }
}

/// Run `op` under the retry policy.
///
/// `op` receives the 1-based attempt number. Retryable failures sleep for
/// [`RetryPolicy::delay_after`] before the next attempt.
pub async fn with_retry<T, F, Fut, C>(
    policy: &RetryPolicy,
    classify: C,
    mut op: F,
) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&Error) -> ErrorClass,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match op(attempt).await {
            Ok(value) => return RetryOutcome::Success(value),
            Err(e) => e,
        };

        let class = classify(&error);
        if !class.is_retryable() {
            return RetryOutcome::PermanentFailure(error);
        }
        if attempt >= max_attempts {
            return RetryOutcome::ExhaustedRetries {
                attempts: attempt,
                last_error: error,
            };
        }

        let delay = policy.delay_after(attempt);
        #[cfg(feature = "tracing")]
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            class = ?class,
            error = %error,
            "generation failed, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_classify_rate_limit() {
        assert_eq!(
            classify_error(&Error::generation("HTTP 429 Too Many Requests")),
            ErrorClass::RateLimited
        );
        assert_eq!(
            classify_error(&Error::generation("too many requests")),
            ErrorClass::RateLimited
        );
    }

    #[test]
    fn test_classify_transient() {
        for msg in [
            "HTTPSConnectionPool(host='api'): Max retries exceeded",
            "ConnectionError: reset by peer",
            "Read timed out. (read timeout=60)",
            "ConnectTimeout",
            "connection reset",
        ] {
            assert_eq!(
                classify_error(&Error::generation(msg)),
                ErrorClass::Transient,
                "{msg}"
            );
        }
        assert_eq!(
            classify_error(&Error::Timeout(Duration::from_secs(1))),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_classify_permanent() {
        assert_eq!(
            classify_error(&Error::generation("invalid API key")),
            ErrorClass::Permanent
        );
        assert_eq!(
            classify_error(&Error::config("429 in a config message")),
            ErrorClass::Permanent
        );
    }

    #[test]
    fn test_delay_schedule() {
        let p = RetryPolicy::new();
        assert_eq!(p.delay_after(1), Duration::from_secs(2));
        assert_eq!(p.delay_after(2), Duration::from_secs(4));
        assert_eq!(p.delay_after(3), Duration::from_secs(8));
        let capped = p.with_max_delay(Duration::from_secs(5));
        assert_eq!(capped.delay_after(3), Duration::from_secs(5));
    }

    #[test]
    fn test_validate() {
        assert!(RetryPolicy::new().validate().is_ok());
        assert!(RetryPolicy::new().with_max_attempts(0).validate().is_err());
        assert!(RetryPolicy::new()
            .with_backoff_factor(0.5)
            .validate()
            .is_err());
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let outcome = with_retry(&RetryPolicy::new(), classify_error, |_| async { Ok(7) }).await;
        assert_eq!(outcome.ok(), Some(7));
    }

    #[tokio::test]
    async fn test_permanent_failure_no_retry() {
        let calls = Cell::new(0);
        let outcome = with_retry(&RetryPolicy::new(), classify_error, |_| {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(Error::generation("model not found")) }
        })
        .await;
        assert!(matches!(outcome, RetryOutcome::PermanentFailure(_)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries() {
        let policy = RetryPolicy::new().with_max_attempts(3);
        let start = tokio::time::Instant::now();
        let outcome = with_retry(&policy, classify_error, |_| async {
            Err::<(), _>(Error::generation("HTTP 429"))
        })
        .await;
        match outcome {
            RetryOutcome::ExhaustedRetries {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.to_string().contains("429"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // 2s + 4s of backoff on the paused clock
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_rate_limit() {
        let outcome = with_retry(&RetryPolicy::new(), classify_error, |attempt| async move {
            if attempt < 3 {
                Err(Error::generation("429 Too Many Requests"))
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(outcome.ok(), Some("done"));
    }
}
