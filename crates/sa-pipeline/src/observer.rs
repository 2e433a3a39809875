//! Run observer trait for progress reporting and streaming output.

use crate::{AnalyzedPoint, RunReport};

/// Callbacks invoked by [`Pipeline::run`][crate::Pipeline::run] as tasks
/// complete.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Callbacks run on the coordinating future,
/// never concurrently with each other.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl RunObserver for Progress {
///     fn on_task_complete(&mut self, completed: usize, total: usize, _: &AnalyzedPoint) {
///         eprintln!("{completed}/{total}");
///     }
/// }
/// ```
pub trait RunObserver {
    /// Called once before any task is dispatched.
    fn on_run_start(&mut self, _total: usize) {}

    /// Called once per finished task, successful or failed.
    ///
    /// `completed` counts finished tasks including this one; it increases by
    /// exactly one per call.  Completion order is not sample order; use
    /// `point.index`.
    fn on_task_complete(&mut self, _completed: usize, _total: usize, _point: &AnalyzedPoint) {}

    /// Called once after every worker has drained, including on a fatal
    /// error.
    fn on_run_end(&mut self, _report: &RunReport) {}
}

/// A [`RunObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
