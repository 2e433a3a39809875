//! `sa-pipeline` — concurrent speed-limit analysis for the speed_audit
//! workspace.
//!
//! # Per-task flow
//!
//! ```text
//! for each sample point (N workers, one shared queue):
//!   ① Heading  — bearing to the next sample (previous at the end);
//!                lookup point moved to the roadside.
//!   ② Fetch    — imagery and capture date requested concurrently;
//!                a metadata failure is only a warning.
//!   ③ Detect   — vision model reads the sign (retried on rate limits).
//!   ④ Validate — drop low-confidence or implausible readings.
//!   ⑤ Classify — compare with the recorded tag in the country's unit.
//!   ⑥ Store    — result written to the slot of the sample's index.
//! ```
//!
//! # Failure routing
//!
//! | Class    | Effect                                                   |
//! |----------|----------------------------------------------------------|
//! | `Fatal`  | Cancels the run; error returned after in-flight tasks.   |
//! | `Quota`  | Task failed, run continues.                              |
//! | `Other`  | Task failed with a truncated message, run continues.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sa_core::AuditConfig;
//! use sa_pipeline::{NoopObserver, Pipeline, RoadQuery, SpeedAudit};
//!
//! let pipeline = Pipeline::new(imagery, detector, AuditConfig::default())?;
//! let audit = SpeedAudit::new(roads, pipeline);
//! let outcome = audit
//!     .audit_road(&RoadQuery::new("Dauphin St", "Mobile", "Alabama"), &mut NoopObserver)
//!     .await?;
//! ```

pub mod audit;
pub mod classify;
pub mod collaborators;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod retry;
pub mod task;


pub use audit::{AuditOutcome, AuditReport, RoadQuery, SpeedAudit};
pub use classify::{classify_discrepancy, validate_detection};
pub use collaborators::{Detection, Imagery, ImageryProvider, RoadDataSource, SignDetector};
pub use error::{CollaboratorError, FailureClass, PipelineError, PipelineResult};
pub use observer::{NoopObserver, RunObserver};
pub use pipeline::{CancelHandle, Pipeline, RunReport, RunSummary};
pub use retry::{RetryPolicy, RetryingDetector, RetryingRoadSource};
pub use task::{AnalyzedPoint, TaskState};
