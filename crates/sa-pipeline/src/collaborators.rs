//! External services the audit depends on.
//!
//! The pipeline treats each one as an opaque async call returning a typed
//! result or a [`CollaboratorError`].  Implementations own their HTTP
//! clients, credentials, and caching.

use std::sync::Arc;

use async_trait::async_trait;

use sa_core::GeoPoint;
use sa_spatial::RoadFragments;

use crate::CollaboratorError;

/// Encoded street-level image.  Shared between the task result and the
/// detector call without copying.
pub type Imagery = Arc<[u8]>;

/// Output of the vision model for one image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Detection {
    /// Limit read from a sign, in the country's unit.  `None` when no sign
    /// was found.
    pub value:      Option<f64>,
    /// Model confidence in `0..=1`.
    pub confidence: f64,
}

impl Detection {
    pub fn none() -> Self {
        Self { value: None, confidence: 0.0 }
    }

    pub fn sign(value: f64, confidence: f64) -> Self {
        Self { value: Some(value), confidence }
    }
}

/// Street-level imagery service.
#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Image taken near `at`, looking along `heading_deg`.
    async fn fetch_imagery(&self, at: GeoPoint, heading_deg: f64) -> Result<Imagery, CollaboratorError>;

    /// Capture date of the imagery nearest `at`.
    async fn fetch_metadata(&self, at: GeoPoint) -> Result<String, CollaboratorError>;
}

/// Vision model reading speed-limit signs.
#[async_trait]
pub trait SignDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Detection, CollaboratorError>;
}

/// Map-data service returning every fragment of a named road.
#[async_trait]
pub trait RoadDataSource: Send + Sync {
    async fn fetch_road_fragments(
        &self,
        name:     &str,
        locality: &str,
        region:   &str,
    ) -> Result<RoadFragments, CollaboratorError>;
}
