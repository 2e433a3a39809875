use sa_core::CoreError;
use sa_spatial::SpatialError;
use thiserror::Error;

use crate::RunReport;

/// Error returned by an external collaborator (map data, imagery, vision
/// model).  The variant decides how the pipeline routes the failure; see
/// [`FailureClass::of`].
#[derive(Clone, Debug, Error)]
pub enum CollaboratorError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),

    /// A retryable error persisted through the whole retry budget.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last:     Box<CollaboratorError>,
    },
}

impl CollaboratorError {
    /// `true` for errors worth another attempt after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CollaboratorError::RateLimited(_) | CollaboratorError::Malformed(_))
    }
}

/// How a failed task affects the rest of the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// Credentials or permissions are wrong; every later call would fail too.
    /// Cancels the run.
    Fatal,
    /// Quota or rate limit.  The task fails, the run continues.
    Quota,
    /// Anything else.  The task fails, the run continues.
    Other,
}

const FATAL_MARKERS: &[&str] = &["unauthorized", "permission", "api key", "forbidden"];
const QUOTA_MARKERS: &[&str] = &["quota", "rate limit", "resource exhausted", "too many requests"];

/// HTTP status codes, matched only as whole tokens.
const FATAL_CODES: &[&str] = &["401", "403"];
const QUOTA_CODES: &[&str] = &["429"];

impl FailureClass {
    pub fn of(err: &CollaboratorError) -> FailureClass {
        match err {
            CollaboratorError::Unauthorized(_) => FailureClass::Fatal,
            CollaboratorError::RateLimited(_) => FailureClass::Quota,
            CollaboratorError::Malformed(_) => FailureClass::Other,
            CollaboratorError::Other(msg) => Self::of_message(msg),
            // A malformed answer that survives every retry means the model
            // cannot be used at all.
            CollaboratorError::Exhausted { last, .. } => match **last {
                CollaboratorError::Malformed(_) => FailureClass::Fatal,
                ref inner => Self::of(inner),
            },
        }
    }

    /// Classify a free-text error from a collaborator that does not type its
    /// failures.
    fn of_message(msg: &str) -> FailureClass {
        let lower = msg.to_ascii_lowercase();
        let has_code = |codes: &[&str]| {
            lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| codes.contains(&token))
        };
        if FATAL_MARKERS.iter().any(|m| lower.contains(m)) || has_code(FATAL_CODES) {
            FailureClass::Fatal
        } else if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) || has_code(QUOTA_CODES) {
            FailureClass::Quota
        } else {
            FailureClass::Other
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("road data unavailable: {0}")]
    RoadData(#[source] CollaboratorError),

    #[error("path assembly failed: {0}")]
    Spatial(#[from] SpatialError),

    /// The run was cancelled by a fatal collaborator error.  `partial` holds
    /// every point completed before the workers drained.
    #[error("run aborted: {source}")]
    Fatal {
        source:  CollaboratorError,
        partial: Box<RunReport>,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
