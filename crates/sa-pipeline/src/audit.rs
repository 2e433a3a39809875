//! Road-level driver: fetch → assemble → sample → analyse.

use std::sync::Arc;

use tracing::{info, warn};

use sa_spatial::{AssembledPath, SamplePoint, assemble_path, sample_path};

use crate::{Pipeline, PipelineError, PipelineResult, RoadDataSource, RunObserver, RunReport};

/// The road to audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoadQuery {
    pub name:     String,
    /// City or town the road runs through.
    pub locality: String,
    /// State, province, or county containing `locality`.
    pub region:   String,
}

impl RoadQuery {
    pub fn new(name: impl Into<String>, locality: impl Into<String>, region: impl Into<String>) -> Self {
        Self { name: name.into(), locality: locality.into(), region: region.into() }
    }
}

/// A completed audit of one road.
#[derive(Clone, Debug)]
pub struct AuditReport {
    pub path:    AssembledPath,
    pub samples: Vec<SamplePoint>,
    pub run:     RunReport,
}

/// How an audit ended.  The first two are normal outcomes: the road has no
/// usable geometry, and nothing is analysed.
#[derive(Clone, Debug)]
pub enum AuditOutcome {
    /// No fragments matched the query, or none could be chained.
    NoRoadFound,
    /// The path is shorter than the start offset.
    NoSamples { path: AssembledPath },
    Analyzed(AuditReport),
}

/// Runs a full audit for named roads.
pub struct SpeedAudit {
    roads:    Arc<dyn RoadDataSource>,
    pipeline: Pipeline,
}

impl SpeedAudit {
    pub fn new(roads: Arc<dyn RoadDataSource>, pipeline: Pipeline) -> Self {
        Self { roads, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Audit one road.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::RoadData`] if the map-data call failed.
    /// - [`PipelineError::Spatial`] if the fragments are inconsistent.
    /// - [`PipelineError::Fatal`] from the analysis run.
    pub async fn audit_road<O: RunObserver>(
        &self,
        query:    &RoadQuery,
        observer: &mut O,
    ) -> PipelineResult<AuditOutcome> {
        let fragments = self
            .roads
            .fetch_road_fragments(&query.name, &query.locality, &query.region)
            .await
            .map_err(PipelineError::RoadData)?;

        let path = assemble_path(&fragments)?;
        if path.is_empty() {
            info!(road = %query.name, locality = %query.locality, "no road found");
            return Ok(AuditOutcome::NoRoadFound);
        }
        if path.chain_count > 1 {
            warn!(
                road = %query.name,
                chains = path.chain_count,
                kept_ways = path.chain.len(),
                "road is split into disconnected pieces; auditing the longest"
            );
        }

        let config = self.pipeline.config();
        let samples = sample_path(&path.points, config.interval_m, config.start_offset_m);
        if samples.is_empty() {
            info!(road = %query.name, points = path.len(), "path too short for sampling");
            return Ok(AuditOutcome::NoSamples { path });
        }

        let run = self.pipeline.run(&samples, observer).await?;
        Ok(AuditOutcome::Analyzed(AuditReport { path, samples, run }))
    }
}
