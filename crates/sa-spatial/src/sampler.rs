//! Even arc-length resampling of an assembled path.
//!
//! Targets are `offset, offset + interval, offset + 2·interval, …` up to and
//! including the path's total length.  Each target is located with a single
//! forward-moving segment cursor over the cumulative-distance array, so the
//! pass is O(vertices + samples).  Zero-length segments (coincident
//! vertices) never contain a target and are stepped over.

use tracing::{debug, warn};

use sa_core::{GeoPoint, WayId};

use crate::PathPoint;

/// Slack (metres) on the final target so that an interval dividing the path
/// length exactly still emits the end point despite float rounding.
const END_TOLERANCE_M: f64 = 1e-6;

/// Upper bound on the samples one path may produce.
pub const MAX_SAMPLES: usize = 1_000_000;

/// One evenly spaced location along the path.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplePoint {
    pub pos:        GeoPoint,
    /// Speed tag of the segment's leading vertex.
    pub speed:      Option<String>,
    pub way:        Option<WayId>,
    /// Arc length from the path start, metres.
    pub distance_m: f64,
}

/// Cumulative haversine distance at each vertex.  `cum[0] == 0`.
pub fn cumulative_distances(points: &[PathPoint]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += points[i - 1].pos.distance_m(p.pos);
        }
        cum.push(total);
    }
    cum
}

/// Resample `points` every `interval_m` metres starting `offset_m` metres in.
///
/// Returns no samples when the path is empty, `interval_m` is not a positive
/// finite distance, `offset_m` is at or past the path's end, or the interval
/// is so fine that the path would need more than [`MAX_SAMPLES`] samples.
pub fn sample_path(points: &[PathPoint], interval_m: f64, offset_m: f64) -> Vec<SamplePoint> {
    if points.len() < 2 || !interval_m.is_finite() || interval_m <= 0.0 || !offset_m.is_finite() {
        return Vec::new();
    }

    let cum = cumulative_distances(points);
    let total = cum[cum.len() - 1];
    let offset = offset_m.max(0.0);
    if offset >= total {
        debug!(offset, total, "sampling offset at or beyond path length");
        return Vec::new();
    }

    let steps = ((total - offset) / interval_m).floor();
    if steps >= MAX_SAMPLES as f64 {
        warn!(interval_m, total, max = MAX_SAMPLES, "sampling interval too fine for path length");
        return Vec::new();
    }

    let last_seg = points.len() - 2;
    let mut samples = Vec::with_capacity(steps as usize + 1);
    let mut seg = 0usize;
    let mut k = 0u64;

    loop {
        let target = offset + k as f64 * interval_m;
        if target > total + END_TOLERANCE_M {
            break;
        }

        while seg < last_seg && cum[seg + 1] <= target {
            seg += 1;
        }

        let len = cum[seg + 1] - cum[seg];
        let t = if len > 0.0 { ((target - cum[seg]) / len).clamp(0.0, 1.0) } else { 0.0 };
        let lead = &points[seg];
        samples.push(SamplePoint {
            pos:        lead.pos.lerp(points[seg + 1].pos, t),
            speed:      lead.speed.clone(),
            way:        lead.way,
            distance_m: target.min(total),
        });
        k += 1;
    }

    debug!(samples = samples.len(), total_m = total, interval_m, offset_m = offset, "sampled path");
    samples
}
