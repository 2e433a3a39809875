//! `ReportObserver<W>` — bridges `RunObserver` to a `ReportWriter`.

use sa_pipeline::{AnalyzedPoint, RunObserver, RunReport};

use crate::row::{AnalyzedPointRow, RunSummaryRow};
use crate::writer::ReportWriter;
use crate::{OutputError, OutputResult};

/// A [`RunObserver`] that streams each analysed point to any
/// [`ReportWriter`] backend as its task completes, then writes the run
/// summary.
///
/// Errors from the writer are stored internally because `RunObserver` methods
/// have no return value.  After `run` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: ReportWriter> {
    writer:     W,
    road:       String,
    last_error: Option<OutputError>,
}

impl<W: ReportWriter> ReportObserver<W> {
    /// Create an observer backed by `writer`; `road` labels the summary row.
    pub fn new(writer: W, road: impl Into<String>) -> Self {
        Self { writer, road: road.into(), last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: ReportWriter> RunObserver for ReportObserver<W> {
    fn on_task_complete(&mut self, _completed: usize, _total: usize, point: &AnalyzedPoint) {
        let result = self.writer.write_point(&AnalyzedPointRow::from(point));
        self.store_err(result);
    }

    fn on_run_end(&mut self, report: &RunReport) {
        let result = self.writer.write_summary(&RunSummaryRow::new(&self.road, report));
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}

/// Write a finished report in sample order, followed by its summary.
///
/// For writing after the fact, when the run was not observed.
pub fn write_report<W: ReportWriter>(writer: &mut W, road: &str, report: &RunReport) -> OutputResult<()> {
    for point in report.completed() {
        writer.write_point(&AnalyzedPointRow::from(point))?;
    }
    writer.write_summary(&RunSummaryRow::new(road, report))?;
    writer.finish()
}
