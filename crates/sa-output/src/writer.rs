//! The `ReportWriter` trait implemented by all backend writers.

use crate::{AnalyzedPointRow, OutputResult, RunSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// When driven by [`ReportObserver`][crate::ReportObserver] errors are stored
/// and retrieved afterwards with
/// [`ReportObserver::take_error`][crate::ReportObserver::take_error].
pub trait ReportWriter {
    /// Write one analysed point.  Points may arrive in completion order;
    /// `row.index` is the sample position.
    fn write_point(&mut self, row: &AnalyzedPointRow) -> OutputResult<()>;

    /// Write the summary of one run.
    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
