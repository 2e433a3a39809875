//! Exponential backoff for rate-limited collaborators.
//!
//! [`RetryPolicy::run`] drives a small state machine, one attempt per
//! iteration:
//!
//! ```text
//! attempt 1 ──ok──▶ done
//!     │ retryable error
//!     ▼
//! sleep(backoff(0) + jitter) ─▶ attempt 2 ─▶ … ─▶ attempt max ──err──▶ Exhausted
//! ```
//!
//! Only [`CollaboratorError::is_retryable`] errors are retried; anything else
//! is returned from the attempt that produced it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use sa_core::RetryConfig;
use sa_spatial::RoadFragments;

use crate::{CollaboratorError, Detection, RoadDataSource, SignDetector};

/// Bounded exponential backoff with random jitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial:      Duration,
    max:          Duration,
    jitter:       Duration,
}

/// Where a retry loop stands between attempts.
struct Backoff {
    attempt: u32,
    delay:   Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial: Duration, max: Duration, jitter: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial, max, jitter }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            Duration::from_millis(config.jitter_ms),
        )
    }

    /// A policy that makes one attempt and never sleeps.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (0-based), without jitter:
    /// `initial · 2^retry`, capped at the maximum.
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial.saturating_mul(1u32 << retry.min(16)).min(self.max)
    }

    fn jittered(&self, base: Duration) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Call `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent.  `what` names the call in log lines.
    ///
    /// # Errors
    ///
    /// The first non-retryable error unchanged, or
    /// [`CollaboratorError::Exhausted`] wrapping the last retryable one.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, CollaboratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let mut state = Backoff { attempt: 0, delay: self.backoff(0) };
        loop {
            state.attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };

            if state.attempt >= self.max_attempts {
                warn!(call = what, attempts = state.attempt, error = %err, "retry budget exhausted");
                return Err(CollaboratorError::Exhausted { attempts: state.attempt, last: Box::new(err) });
            }

            let sleep_for = self.jittered(state.delay);
            debug!(call = what, attempt = state.attempt, delay_ms = sleep_for.as_millis() as u64, error = %err, "retrying");
            tokio::time::sleep(sleep_for).await;
            state.delay = self.backoff(state.attempt);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

// ── Retrying collaborator wrappers ────────────────────────────────────────────

/// A [`SignDetector`] that retries rate-limit and malformed-response errors.
pub struct RetryingDetector<D> {
    inner:  D,
    policy: RetryPolicy,
}

impl<D: SignDetector> RetryingDetector<D> {
    pub fn new(inner: D, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: SignDetector> SignDetector for RetryingDetector<D> {
    async fn detect(&self, image: &[u8]) -> Result<Detection, CollaboratorError> {
        self.policy.run("sign detection", || self.inner.detect(image)).await
    }
}

/// A [`RoadDataSource`] that retries rate-limit and malformed-response errors.
pub struct RetryingRoadSource<S> {
    inner:  S,
    policy: RetryPolicy,
}

impl<S: RoadDataSource> RetryingRoadSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RoadDataSource> RoadDataSource for RetryingRoadSource<S> {
    async fn fetch_road_fragments(
        &self,
        name:     &str,
        locality: &str,
        region:   &str,
    ) -> Result<RoadFragments, CollaboratorError> {
        self.policy
            .run("road data", || self.inner.fetch_road_fragments(name, locality, region))
            .await
    }
}
