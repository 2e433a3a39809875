//! The bounded worker pool.
//!
//! `N` worker futures share one claim cursor over the sample list.  Each
//! worker checks the cancel flag, claims the next index, runs the task, and
//! sends the outcome to the coordinator over a channel.  The coordinator
//! owns the pre-sized result slots and the observer, so no slot is written
//! twice and callbacks never race.
//!
//! A fatal failure sets the cancel flag from inside the worker, before it
//! could claim another task.  Tasks already in flight finish; their results
//! are kept in the partial report returned with the error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use sa_core::AuditConfig;
use sa_spatial::SamplePoint;

use crate::task::{TaskContext, TaskOutcome};
use crate::{
    AnalyzedPoint, CollaboratorError, FailureClass, ImageryProvider, PipelineError, PipelineResult,
    RunObserver, SignDetector,
};

// ── Report ────────────────────────────────────────────────────────────────────

/// Counts over one run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of sample points submitted.
    pub total:         usize,
    /// Tasks that reached a classification.
    pub analyzed:      usize,
    pub discrepancies: usize,
    pub failed:        usize,
    /// Samples never dispatched because the run was cancelled.
    pub skipped:       usize,
}

/// Results of one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// `points[i]` is the result for sample `i`; `None` if it was never
    /// dispatched.
    pub points:    Vec<Option<AnalyzedPoint>>,
    pub cancelled: bool,
    pub summary:   RunSummary,
}

impl RunReport {
    fn from_slots(points: Vec<Option<AnalyzedPoint>>, cancelled: bool) -> Self {
        let mut summary = RunSummary { total: points.len(), ..RunSummary::default() };
        for slot in &points {
            match slot {
                None => summary.skipped += 1,
                Some(p) if p.is_failed() => summary.failed += 1,
                Some(p) => {
                    summary.analyzed += 1;
                    if p.is_discrepancy {
                        summary.discrepancies += 1;
                    }
                }
            }
        }
        Self { points, cancelled, summary }
    }

    /// Finished points in sample order.
    pub fn completed(&self) -> impl Iterator<Item = &AnalyzedPoint> {
        self.points.iter().flatten()
    }

    pub fn discrepancies(&self) -> impl Iterator<Item = &AnalyzedPoint> {
        self.completed().filter(|p| p.is_discrepancy)
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

/// Requests cooperative cancellation of a [`Pipeline`].  Workers stop
/// claiming new tasks; tasks in flight run to completion.
#[derive(Clone, Debug)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Analyses sample points against imagery with a bounded number of
/// concurrent tasks.
///
/// Cancellation is sticky: once the pipeline is cancelled, by a
/// [`CancelHandle`] or a fatal error, later runs dispatch nothing.
pub struct Pipeline {
    ctx:       TaskContext,
    config:    AuditConfig,
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    /// # Errors
    ///
    /// [`PipelineError::Config`] if `config` does not validate.
    pub fn new(
        imagery:  Arc<dyn ImageryProvider>,
        detector: Arc<dyn SignDetector>,
        config:   AuditConfig,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let ctx = TaskContext {
            imagery,
            detector,
            profile: config.profile(),
            confidence_threshold: config.confidence_threshold,
            lateral_offset_m: config.lateral_offset_m,
            error_message_limit: config.error_message_limit,
        };
        Ok(Self { ctx, config, cancelled: Arc::new(AtomicBool::new(false)) })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    /// Analyse every sample, returning results in sample order.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Fatal`] if any task failed with a
    /// [`FailureClass::Fatal`] error.  It carries the first such error and
    /// the partial report; it is returned once, after all workers drained.
    pub async fn run<O: RunObserver>(
        &self,
        samples:  &[SamplePoint],
        observer: &mut O,
    ) -> PipelineResult<RunReport> {
        let total = samples.len();
        let workers = self.config.effective_concurrency().min(total.max(1));
        info!(samples = total, workers, country = %self.ctx.profile.code, "starting analysis run");
        observer.on_run_start(total);

        let cursor = AtomicUsize::new(0);
        let (tx, mut rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let pool: Vec<_> = (0..workers)
            .map(|id| self.worker(id, samples, &cursor, tx.clone()))
            .collect();
        // Only workers hold senders now, so `recv` ends when the last exits.
        drop(tx);

        let mut slots: Vec<Option<AnalyzedPoint>> = vec![None; total];
        let collect = async {
            let mut completed = 0usize;
            let mut fatal: Option<CollaboratorError> = None;
            while let Some(outcome) = rx.recv().await {
                completed += 1;
                if let Some((FailureClass::Fatal, err)) = outcome.failure {
                    fatal.get_or_insert(err);
                }
                observer.on_task_complete(completed, total, &outcome.point);
                let index = outcome.point.index;
                slots[index] = Some(outcome.point);
            }
            fatal
        };
        let (_, fatal) = tokio::join!(join_all(pool), collect);

        let report = RunReport::from_slots(slots, self.cancelled.load(Ordering::Acquire));
        info!(
            analyzed = report.summary.analyzed,
            discrepancies = report.summary.discrepancies,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            cancelled = report.cancelled,
            "analysis run finished"
        );
        observer.on_run_end(&report);

        match fatal {
            Some(source) => Err(PipelineError::Fatal { source, partial: Box::new(report) }),
            None => Ok(report),
        }
    }

    async fn worker(
        &self,
        id:      usize,
        samples: &[SamplePoint],
        cursor:  &AtomicUsize,
        tx:      mpsc::UnboundedSender<TaskOutcome>,
    ) {
        loop {
            if self.cancelled.load(Ordering::Acquire) {
                break;
            }
            let index = cursor.fetch_add(1, Ordering::AcqRel);
            if index >= samples.len() {
                break;
            }

            let outcome = self.ctx.run(samples, index).await;
            if let Some((class, err)) = &outcome.failure {
                match class {
                    FailureClass::Fatal => {
                        if !self.cancelled.swap(true, Ordering::AcqRel) {
                            error!(worker = id, index, error = %err, "fatal collaborator error; cancelling run");
                        }
                    }
                    FailureClass::Quota => {
                        warn!(worker = id, index, error = %err, "quota or rate limit hit; task failed");
                    }
                    FailureClass::Other => {
                        warn!(worker = id, index, error = %err, "task failed");
                    }
                }
            }
            if tx.send(outcome).is_err() {
                break;
            }
        }
    }
}
