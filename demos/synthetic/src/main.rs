//! `speed_audit` — end-to-end audit of a synthetic road.
//!
//! A 1.6 km stretch of "Dauphin Street" is served as Overpass JSON by an
//! in-memory map source.  Imagery is faked by encoding the requested
//! latitude into the image bytes; the mock detector reads a 45 mph sign on
//! the northern third of the road (recorded as 30 mph) and rate-limits every
//! seventh call so the retry path is exercised.
//!
//! Run with:
//!   cargo run -p speed_audit --release [-- path/to/config.json]
//!
//! Results are written to `output/synthetic/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sa_core::{AuditConfig, GeoPoint};
use sa_output::{CsvWriter, ReportObserver};
use sa_pipeline::{
    AuditOutcome, CollaboratorError, Detection, Imagery, ImageryProvider, Pipeline, RetryPolicy,
    RetryingDetector, RetryingRoadSource, RoadDataSource, RoadQuery, SignDetector, SpeedAudit,
};
use sa_spatial::{RoadFragments, overpass};

// ── Constants ─────────────────────────────────────────────────────────────────

const ROAD:     &str = "Dauphin Street";
const LOCALITY: &str = "Mobile";
const REGION:   &str = "Alabama";

/// South end of the synthetic road.
const START_LAT: f64 = 30.6900;
const LON:       f64 = -88.0430;
/// Latitude step between consecutive nodes (~111 m).
const NODE_STEP: f64 = 0.001;
const NODE_COUNT: i64 = 15;
/// Signs north of this latitude read 45 mph.
const FAST_ZONE_LAT: f64 = 30.6995;

const OUTPUT_DIR: &str = "output/synthetic";

// ── Synthetic map data ────────────────────────────────────────────────────────

/// Three ways sharing endpoints, listed out of order, plus an unrelated
/// footway that the name filter must drop.
fn overpass_body() -> String {
    let mut elements: Vec<Value> = (0..NODE_COUNT)
        .map(|i| {
            json!({
                "type": "node",
                "id":   1000 + i,
                "lat":  START_LAT + i as f64 * NODE_STEP,
                "lon":  LON,
            })
        })
        .collect();

    let way = |id: i64, nodes: std::ops::RangeInclusive<i64>, name: &str| {
        json!({
            "type":  "way",
            "id":    id,
            "nodes": nodes.map(|n| 1000 + n).collect::<Vec<_>>(),
            "tags":  { "highway": "secondary", "name": name, "maxspeed": "30 mph" },
        })
    };
    elements.push(way(502, 9..=14, "Dauphin St"));
    elements.push(way(500, 0..=4, "Dauphin Street"));
    elements.push(way(501, 4..=9, "Dauphin St."));
    elements.push(json!({
        "type":  "way",
        "id":    900,
        "nodes": [1000, 1001],
        "tags":  { "highway": "footway", "name": "Dauphin Street" },
    }));

    json!({ "version": 0.6, "elements": elements }).to_string()
}

struct StaticOverpass {
    body: String,
}

#[async_trait]
impl RoadDataSource for StaticOverpass {
    async fn fetch_road_fragments(
        &self,
        name:      &str,
        locality:  &str,
        region:    &str,
    ) -> Result<RoadFragments, CollaboratorError> {
        info!(query = %overpass::build_query(name, locality, region).replace('\n', " "), "overpass request");
        overpass::parse_response(&self.body, Some(name))
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))
    }
}

// ── Mock imagery and detection ────────────────────────────────────────────────

struct LatitudeImagery;

#[async_trait]
impl ImageryProvider for LatitudeImagery {
    async fn fetch_imagery(&self, at: GeoPoint, _heading_deg: f64) -> Result<Imagery, CollaboratorError> {
        Ok(Arc::from(at.lat.to_le_bytes().to_vec()))
    }

    async fn fetch_metadata(&self, _at: GeoPoint) -> Result<String, CollaboratorError> {
        Ok("2024-05".to_owned())
    }
}

struct ZoneDetector {
    calls: AtomicUsize,
}

#[async_trait]
impl SignDetector for ZoneDetector {
    async fn detect(&self, image: &[u8]) -> Result<Detection, CollaboratorError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if call % 7 == 0 {
            return Err(CollaboratorError::RateLimited("429 Too Many Requests".into()));
        }
        let bytes: [u8; 8] = image
            .try_into()
            .map_err(|_| CollaboratorError::Malformed(format!("{} byte image", image.len())))?;
        let lat = f64::from_le_bytes(bytes);
        Ok(if lat > FAST_ZONE_LAT { Detection::sign(45.0, 0.93) } else { Detection::sign(30.0, 0.88) })
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<AuditConfig> {
    let mut config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => AuditConfig::from_path(&path)?,
        None => AuditConfig { interval_m: 100.0, concurrency: 4, ..AuditConfig::default() },
    };
    // Mock collaborators answer instantly; keep the backoff short.
    config.retry.initial_backoff_ms = config.retry.initial_backoff_ms.min(50);
    config.retry.jitter_ms = config.retry.jitter_ms.min(10);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("speed_audit=info,sa_pipeline=info,sa_spatial=info")),
        )
        .init();

    let config = load_config()?;
    println!("=== speed_audit — synthetic road ===");
    println!(
        "Road: {ROAD}, {LOCALITY}, {REGION}  |  interval {} m  |  workers {}  |  country {}",
        config.interval_m,
        config.effective_concurrency(),
        config.country
    );
    println!();

    let policy = RetryPolicy::from_config(&config.retry);
    let roads = RetryingRoadSource::new(StaticOverpass { body: overpass_body() }, policy.clone());
    let detector = RetryingDetector::new(ZoneDetector { calls: AtomicUsize::new(0) }, policy);

    let pipeline = Pipeline::new(Arc::new(LatitudeImagery), Arc::new(detector), config)?;
    let audit = SpeedAudit::new(Arc::new(roads), pipeline);

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = ReportObserver::new(writer, ROAD);

    let t0 = Instant::now();
    let outcome = audit.audit_road(&RoadQuery::new(ROAD, LOCALITY, REGION), &mut obs).await?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    let report = match outcome {
        AuditOutcome::NoRoadFound => {
            println!("No road named {ROAD:?} found.");
            return Ok(());
        }
        AuditOutcome::NoSamples { path } => {
            println!("Road found ({} vertices) but too short to sample.", path.len());
            return Ok(());
        }
        AuditOutcome::Analyzed(report) => report,
    };

    let s = report.run.summary;
    println!("Audit complete in {:.3} s", elapsed.as_secs_f64());
    println!("  path        : {} vertices over {} ways", report.path.len(), report.path.chain.len());
    println!("  samples     : {}", s.total);
    println!("  analyzed    : {}", s.analyzed);
    println!("  failed      : {}", s.failed);
    println!("  discrepancy : {}", s.discrepancies);
    println!("  output      : {OUTPUT_DIR}/analyzed_points.csv, {OUTPUT_DIR}/run_summary.csv");
    println!();

    println!("{:<6} {:<10} {:<11} {:<10} {:<8}", "Index", "Dist (m)", "Recorded", "Detected", "Flag");
    println!("{}", "-".repeat(48));
    for p in report.run.completed() {
        println!(
            "{:<6} {:<10.1} {:<11} {:<10} {:<8}",
            p.index,
            p.location.distance_m,
            p.recorded_speed.as_deref().unwrap_or("-"),
            p.detected_speed.map_or_else(|| "-".to_owned(), |v| format!("{v:.0}")),
            if p.is_discrepancy { "MISMATCH" } else { p.state.as_str() },
        );
    }

    Ok(())
}
