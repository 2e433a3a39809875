//! Plain data row types written by output backends.

use sa_pipeline::{AnalyzedPoint, RunReport};

/// One analysed sample point, flattened for tabular output.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedPointRow {
    pub index:          u64,
    pub lat:            f64,
    pub lon:            f64,
    /// Arc length from the start of the path, metres.
    pub distance_m:     f64,
    pub heading:        f64,
    /// OSM way id; `None` when the sample has no source way.
    pub way_id:         Option<i64>,
    pub recorded_speed: Option<String>,
    pub detected_speed: Option<f64>,
    pub confidence:     Option<f64>,
    pub is_discrepancy: bool,
    /// Final task state (`classified` or `failed`).
    pub status:         &'static str,
    pub image_date:     Option<String>,
    pub error:          Option<String>,
}

impl From<&AnalyzedPoint> for AnalyzedPointRow {
    fn from(p: &AnalyzedPoint) -> Self {
        Self {
            index:          p.index as u64,
            lat:            p.location.pos.lat,
            lon:            p.location.pos.lon,
            distance_m:     p.location.distance_m,
            heading:        p.heading,
            way_id:         p.way.map(|w| w.raw()),
            recorded_speed: p.recorded_speed.clone(),
            detected_speed: p.detected_speed,
            confidence:     p.confidence,
            is_discrepancy: p.is_discrepancy,
            status:         p.state.as_str(),
            image_date:     p.image_date.clone(),
            error:          p.error.clone(),
        }
    }
}

/// Counts for one audited road.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummaryRow {
    pub road:          String,
    pub total:         u64,
    pub analyzed:      u64,
    pub discrepancies: u64,
    pub failed:        u64,
    pub skipped:       u64,
    pub cancelled:     bool,
}

impl RunSummaryRow {
    pub fn new(road: &str, report: &RunReport) -> Self {
        let s = report.summary;
        Self {
            road:          road.to_owned(),
            total:         s.total as u64,
            analyzed:      s.analyzed as u64,
            discrepancies: s.discrepancies as u64,
            failed:        s.failed as u64,
            skipped:       s.skipped as u64,
            cancelled:     report.cancelled,
        }
    }
}
