//! Spatial-subsystem error type.
//!
//! "Nothing found" is never an error here: an empty fragment set assembles
//! to an empty path and an empty path samples to no points.  These variants
//! cover input the crate cannot interpret.

use thiserror::Error;

use sa_core::{NodeId, WayId};

/// Errors produced by `sa-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("{way} references {node}, which has no coordinates")]
    MissingNode { way: WayId, node: NodeId },

    #[error("malformed map data: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
