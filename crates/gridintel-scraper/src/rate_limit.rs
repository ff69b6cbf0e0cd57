//! Request pacing and retry utilities for the source fetcher.
//!
//! Every attempt (first try and retries alike) waits out a pacing delay
//! first, so a source is never hit faster than the configured rate.
//! Failed attempts additionally wait `backoff_base * 2^attempt` before the
//! next try. Non-retriable errors (an unparseable URL, an extraction error)
//! are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Delay applied before every request attempt.
///
/// When `min < max` the delay is drawn uniformly from `[min, max]`;
/// otherwise it is the fixed `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    /// A randomized delay in `[min, max]`. Bounds are swapped if inverted.
    #[must_use]
    pub fn between(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// No pacing. Used by tests.
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws the delay for the next attempt.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        #[allow(clippy::cast_possible_truncation)]
        let (lo, hi) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        Duration::from_millis(rand::random_range(lo..=hi))
    }
}

/// Attempt budget and delays for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Base delay for exponential backoff after a failed attempt.
    pub backoff_base: Duration,
    pub pacing: Pacing,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            pacing: Pacing::between(Duration::from_secs(2), Duration::from_secs(5)),
        }
    }
}

/// Returns `true` if `err` may succeed on a later attempt.
///
/// Retriable: transport failures, rate limiting, and any non-2xx status.
/// Not retriable: malformed URLs and extraction errors.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Http(_) | ScraperError::RateLimited { .. } | ScraperError::UnexpectedStatus { .. }
    )
}

/// Wait before retrying after the failed attempt number `attempt` (0-based).
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

/// Executes `operation` under `policy`.
///
/// # Backoff schedule (example with `backoff_base = 1s`, `max_attempts = 3`)
///
/// | Attempt | Before attempt | After failure |
/// |---------|----------------|---------------|
/// | 0 | pacing | 1s × 2^0 = 1s |
/// | 1 | pacing | 1s × 2^1 = 2s |
/// | 2 | pacing | none (exhausted, error returned) |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: FetchPolicy,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        let pace = policy.pacing.next_delay();
        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt + 1 >= max_attempts {
                    return Err(err);
                }

                let delay = backoff_delay(policy.backoff_base, attempt);
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "request failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
