//! One analysis task: a sample point in, an [`AnalyzedPoint`] out.
//!
//! ```text
//! Pending ─▶ Fetching ─▶ Detecting ─▶ Classified
//!               │            │
//!               └────────────┴──────▶ Failed
//! ```
//!
//! A failed task still yields an `AnalyzedPoint` (no detected speed, the
//! error message truncated) so every sample index has a result.

use std::sync::Arc;

use tracing::{debug, warn};

use sa_core::{CountryProfile, GeoPoint, WayId};
use sa_spatial::SamplePoint;

use crate::classify::{classify_discrepancy, validate_detection};
use crate::{CollaboratorError, FailureClass, Imagery, ImageryProvider, SignDetector};

/// Lifecycle of one analysis task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fetching,
    Detecting,
    Classified,
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Pending    => "pending",
            TaskState::Fetching   => "fetching",
            TaskState::Detecting  => "detecting",
            TaskState::Classified => "classified",
            TaskState::Failed     => "failed",
        }
    }
}

/// The result for one sample point.
#[derive(Clone, Debug)]
pub struct AnalyzedPoint {
    /// Index of the sample this point was produced from.
    pub index:          usize,
    pub location:       SamplePoint,
    /// Roadside position the imagery was requested for.
    pub lookup:         GeoPoint,
    /// Direction of travel at the sample, degrees clockwise from north.
    pub heading:        f64,
    /// Raw speed tag of the segment.
    pub recorded_speed: Option<String>,
    /// Validated detected limit, in the country's unit.
    pub detected_speed: Option<f64>,
    pub confidence:     Option<f64>,
    pub is_discrepancy: bool,
    pub imagery:        Option<Imagery>,
    pub way:            Option<WayId>,
    pub image_date:     Option<String>,
    pub state:          TaskState,
    pub error:          Option<String>,
}

impl AnalyzedPoint {
    fn pending(index: usize, location: &SamplePoint, lookup: GeoPoint, heading: f64) -> Self {
        Self {
            index,
            lookup,
            heading,
            recorded_speed: location.speed.clone(),
            detected_speed: None,
            confidence: None,
            is_discrepancy: false,
            imagery: None,
            way: location.way,
            image_date: None,
            state: TaskState::Pending,
            error: None,
            location: location.clone(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state == TaskState::Failed
    }
}

/// Everything a worker needs besides the sample list.
pub(crate) struct TaskContext {
    pub(crate) imagery:              Arc<dyn ImageryProvider>,
    pub(crate) detector:             Arc<dyn SignDetector>,
    pub(crate) profile:              CountryProfile,
    pub(crate) confidence_threshold: f64,
    pub(crate) lateral_offset_m:     f64,
    pub(crate) error_message_limit:  usize,
}

/// A finished task and, if it failed, the classified cause.
pub(crate) struct TaskOutcome {
    pub(crate) point:   AnalyzedPoint,
    pub(crate) failure: Option<(FailureClass, CollaboratorError)>,
}

/// Direction of travel at `samples[index]`: towards the next sample, or
/// from the previous one at the end of the path.
pub fn heading_at(samples: &[SamplePoint], index: usize) -> f64 {
    if let Some(next) = samples.get(index + 1) {
        samples[index].pos.bearing_deg(next.pos)
    } else if index > 0 {
        samples[index - 1].pos.bearing_deg(samples[index].pos)
    } else {
        0.0
    }
}

fn truncate(message: &str, limit: usize) -> String {
    match message.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &message[..cut]),
        None => message.to_owned(),
    }
}

impl TaskContext {
    pub(crate) async fn run(&self, samples: &[SamplePoint], index: usize) -> TaskOutcome {
        let sample = &samples[index];
        let heading = heading_at(samples, index);
        let lookup = sample
            .pos
            .destination(heading + self.profile.roadside_bearing_offset(), self.lateral_offset_m);
        let mut point = AnalyzedPoint::pending(index, sample, lookup, heading);

        point.state = TaskState::Fetching;
        let (imagery, metadata) = tokio::join!(
            self.imagery.fetch_imagery(lookup, heading),
            self.imagery.fetch_metadata(lookup),
        );
        match metadata {
            Ok(date) => point.image_date = Some(date),
            Err(err) => {
                warn!(index, error = %err, "imagery metadata unavailable; continuing without capture date");
            }
        }
        let image = match imagery {
            Ok(image) => image,
            Err(err) => return self.fail(point, err),
        };
        point.imagery = Some(Arc::clone(&image));

        point.state = TaskState::Detecting;
        let detection = match self.detector.detect(&image).await {
            Ok(detection) => detection,
            Err(err) => return self.fail(point, err),
        };

        point.confidence = Some(detection.confidence);
        point.detected_speed = validate_detection(&detection, self.confidence_threshold, &self.profile);
        point.is_discrepancy =
            classify_discrepancy(point.recorded_speed.as_deref(), point.detected_speed, &self.profile);
        point.state = TaskState::Classified;

        debug!(
            index,
            recorded = point.recorded_speed.as_deref().unwrap_or("-"),
            detected = ?point.detected_speed,
            discrepancy = point.is_discrepancy,
            "task classified"
        );
        TaskOutcome { point, failure: None }
    }

    fn fail(&self, mut point: AnalyzedPoint, err: CollaboratorError) -> TaskOutcome {
        let class = FailureClass::of(&err);
        debug!(index = point.index, during = point.state.as_str(), ?class, error = %err, "task failed");
        point.state = TaskState::Failed;
        point.detected_speed = None;
        point.is_discrepancy = false;
        point.error = Some(truncate(&err.to_string(), self.error_message_limit));
        TaskOutcome { point, failure: Some((class, err)) }
    }
}
