//! Audit run configuration.
//!
//! Typically loaded from a JSON file by the application and passed to the
//! pipeline.  Every field has a default, so a config file only needs the
//! values it changes:
//!
//! ```json
//! { "interval_m": 25.0, "country": "GB", "concurrency": 8 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, CountryProfile};

/// Hard upper bound on concurrent analysis workers.
pub const MAX_CONCURRENCY: usize = 20;

/// Smallest accepted sampling interval, metres.
pub const MIN_INTERVAL_M: f64 = 0.1;

/// Top-level configuration for one audit run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Distance between sample points along the road, metres.
    pub interval_m: f64,

    /// Arc length skipped before the first sample, metres.
    pub start_offset_m: f64,

    /// Number of concurrent analysis workers.  Clamped to
    /// `1..=MAX_CONCURRENCY` by [`effective_concurrency`](Self::effective_concurrency).
    pub concurrency: usize,

    /// Detections with a confidence below this value are discarded.
    pub confidence_threshold: f64,

    /// ISO 3166-1 alpha-2 country code; selects unit system, plausibility
    /// bounds, and the roadside signs stand on.
    pub country: String,

    /// How far (metres) the imagery lookup is moved off the centreline
    /// towards the roadside.
    pub lateral_offset_m: f64,

    /// Failed-task error messages are truncated to this many characters.
    pub error_message_limit: usize,

    /// Backoff policy for the vision model and map-data calls.
    pub retry: RetryConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            interval_m:           50.0,
            start_offset_m:       0.0,
            concurrency:          5,
            confidence_threshold: 0.7,
            country:              "US".to_owned(),
            lateral_offset_m:     4.0,
            error_message_limit:  120,
            retry:                RetryConfig::default(),
        }
    }
}

/// Exponential backoff settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts:       u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms:     u64,
    /// Upper bound of the random jitter added to each delay.
    pub jitter_ms:          u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts:       4,
            initial_backoff_ms: 1_000,
            max_backoff_ms:     16_000,
            jitter_ms:          250,
        }
    }
}

impl AuditConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: AuditConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.interval_m.is_finite() || self.interval_m < MIN_INTERVAL_M {
            return Err(CoreError::Config(format!(
                "interval_m must be at least {MIN_INTERVAL_M} m, got {}",
                self.interval_m
            )));
        }
        if !self.start_offset_m.is_finite() || self.start_offset_m < 0.0 {
            return Err(CoreError::Config(format!(
                "start_offset_m must be non-negative, got {}",
                self.start_offset_m
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(CoreError::Config(format!(
                "confidence_threshold must be within 0..=1, got {}",
                self.confidence_threshold
            )));
        }
        if !self.lateral_offset_m.is_finite() || self.lateral_offset_m < 0.0 {
            return Err(CoreError::Config(format!(
                "lateral_offset_m must be non-negative, got {}",
                self.lateral_offset_m
            )));
        }
        if self.country.trim().len() != 2 {
            return Err(CoreError::Config(format!(
                "country must be a two-letter ISO code, got {:?}",
                self.country
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(CoreError::Config(format!(
                "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.retry.initial_backoff_ms, self.retry.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Worker count actually used: `concurrency` clamped to
    /// `1..=MAX_CONCURRENCY`.
    #[inline]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Country conventions for this run.
    pub fn profile(&self) -> CountryProfile {
        CountryProfile::for_country(&self.country)
    }
}
