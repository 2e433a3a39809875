//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `analyzed_points.csv`
//! - `run_summary.csv`
//!
//! Missing values are written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{AnalyzedPointRow, OutputResult, RunSummaryRow};
use crate::writer::ReportWriter;

pub const POINT_HEADERS: [&str; 13] = [
    "index",
    "lat",
    "lon",
    "distance_m",
    "heading",
    "way_id",
    "recorded_speed",
    "detected_speed",
    "confidence",
    "is_discrepancy",
    "status",
    "image_date",
    "error",
];

pub const SUMMARY_HEADERS: [&str; 7] =
    ["road", "total", "analyzed", "discrepancies", "failed", "skipped", "cancelled"];

/// Writes audit output to two CSV files.
pub struct CsvWriter {
    points:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut points = Writer::from_path(dir.join("analyzed_points.csv"))?;
        points.write_record(POINT_HEADERS)?;

        let mut summaries = Writer::from_path(dir.join("run_summary.csv"))?;
        summaries.write_record(SUMMARY_HEADERS)?;

        Ok(Self { points, summaries, finished: false })
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

impl ReportWriter for CsvWriter {
    fn write_point(&mut self, row: &AnalyzedPointRow) -> OutputResult<()> {
        self.points.write_record(&[
            row.index.to_string(),
            row.lat.to_string(),
            row.lon.to_string(),
            format!("{:.1}", row.distance_m),
            format!("{:.1}", row.heading),
            opt(&row.way_id),
            opt(&row.recorded_speed),
            opt(&row.detected_speed),
            opt(&row.confidence),
            (row.is_discrepancy as u8).to_string(),
            row.status.to_owned(),
            opt(&row.image_date),
            opt(&row.error),
        ])?;
        Ok(())
    }

    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.road.clone(),
            row.total.to_string(),
            row.analyzed.to_string(),
            row.discrepancies.to_string(),
            row.failed.to_string(),
            row.skipped.to_string(),
            (row.cancelled as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.points.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
