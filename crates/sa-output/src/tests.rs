//! Tests for sa-output.

use sa_core::{GeoPoint, WayId};
use sa_pipeline::{AnalyzedPoint, RunReport, RunSummary, TaskState};
use sa_spatial::SamplePoint;

fn point(index: usize, detected: Option<f64>, discrepancy: bool) -> AnalyzedPoint {
    let pos = GeoPoint::new(30.0 + index as f64 * 0.001, -88.0);
    AnalyzedPoint {
        index,
        location: SamplePoint {
            pos,
            speed:      Some("30 mph".into()),
            way:        Some(WayId(7)),
            distance_m: index as f64 * 111.0,
        },
        lookup:         pos.destination(90.0, 4.0),
        heading:        0.0,
        recorded_speed: Some("30 mph".into()),
        detected_speed: detected,
        confidence:     detected.map(|_| 0.9),
        is_discrepancy: discrepancy,
        imagery:        None,
        way:            Some(WayId(7)),
        image_date:     Some("2023-06".into()),
        state:          TaskState::Classified,
        error:          None,
    }
}

fn failed_point(index: usize) -> AnalyzedPoint {
    AnalyzedPoint {
        state: TaskState::Failed,
        error: Some("rate limited: quota exceeded".into()),
        image_date: None,
        ..point(index, None, false)
    }
}

/// Three finished points (one discrepancy, one failure) and one skipped.
fn report() -> RunReport {
    RunReport {
        points: vec![
            Some(point(0, Some(45.0), true)),
            Some(point(1, Some(30.0), false)),
            Some(failed_point(2)),
            None,
        ],
        cancelled: true,
        summary: RunSummary { total: 4, analyzed: 2, discrepancies: 1, failed: 1, skipped: 1 },
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use super::*;
    use crate::row::{AnalyzedPointRow, RunSummaryRow};

    #[test]
    fn point_row_flattens_fields() {
        let row = AnalyzedPointRow::from(&point(3, Some(45.0), true));
        assert_eq!(row.index, 3);
        assert_eq!(row.way_id, Some(7));
        assert_eq!(row.detected_speed, Some(45.0));
        assert_eq!(row.status, "classified");
        assert!(row.is_discrepancy);
        assert!((row.distance_m - 333.0).abs() < 1e-9);
    }

    #[test]
    fn failed_point_row_keeps_error() {
        let row = AnalyzedPointRow::from(&failed_point(1));
        assert_eq!(row.status, "failed");
        assert_eq!(row.detected_speed, None);
        assert_eq!(row.error.as_deref(), Some("rate limited: quota exceeded"));
    }

    #[test]
    fn summary_row_copies_counts() {
        let row = RunSummaryRow::new("Dauphin St", &report());
        assert_eq!(row.road, "Dauphin St");
        assert_eq!((row.total, row.analyzed, row.discrepancies, row.failed, row.skipped), (4, 2, 1, 1, 1));
        assert!(row.cancelled);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::{CsvWriter, POINT_HEADERS, SUMMARY_HEADERS};
    use crate::observer::write_report;
    use crate::writer::ReportWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read(&dir, "analyzed_points.csv");
        assert_eq!(headers, POINT_HEADERS);
        assert!(rows.is_empty());
        let (headers, _) = read(&dir, "run_summary.csv");
        assert_eq!(headers, SUMMARY_HEADERS);
    }

    #[test]
    fn report_rows_in_sample_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        write_report(&mut w, "Dauphin St", &report()).unwrap();

        let (_, rows) = read(&dir, "analyzed_points.csv");
        assert_eq!(rows.len(), 3, "skipped sample has no row");
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][7], "45"); // detected_speed
        assert_eq!(&rows[0][9], "1"); // is_discrepancy
        assert_eq!(&rows[1][9], "0");
        assert_eq!(&rows[2][0], "2");
        assert_eq!(&rows[2][7], ""); // no detection
        assert_eq!(&rows[2][10], "failed");
        assert_eq!(&rows[2][11], ""); // no image date
        assert_eq!(&rows[2][12], "rate limited: quota exceeded");

        let (_, summary) = read(&dir, "run_summary.csv");
        assert_eq!(summary.len(), 1);
        let fields: Vec<&str> = summary[0].iter().collect();
        assert_eq!(fields, ["Dauphin St", "4", "2", "1", "1", "1", "1"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use sa_core::AuditConfig;
    use sa_pipeline::{
        CollaboratorError, Detection, Imagery, ImageryProvider, Pipeline, RunObserver, SignDetector,
    };

    use super::*;
    use crate::row::{AnalyzedPointRow, RunSummaryRow};
    use crate::writer::ReportWriter;
    use crate::{CsvWriter, OutputError, OutputResult, ReportObserver};

    /// Rejects every write.
    struct BrokenWriter {
        finished: usize,
    }

    impl ReportWriter for BrokenWriter {
        fn write_point(&mut self, _row: &AnalyzedPointRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }

        fn write_summary(&mut self, _row: &RunSummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk gone")))
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let mut obs = ReportObserver::new(BrokenWriter { finished: 0 }, "Main St");
        let r = report();
        for p in r.completed() {
            obs.on_task_complete(p.index + 1, 4, p);
        }
        obs.on_run_end(&r);

        let err = obs.take_error().expect("write error stored");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().finished, 1);
    }

    struct StaticImagery;

    #[async_trait]
    impl ImageryProvider for StaticImagery {
        async fn fetch_imagery(&self, _at: GeoPoint, _heading: f64) -> Result<Imagery, CollaboratorError> {
            Ok(Arc::from(vec![0u8; 4]))
        }

        async fn fetch_metadata(&self, _at: GeoPoint) -> Result<String, CollaboratorError> {
            Ok("2024-01".into())
        }
    }

    struct Sign40;

    #[async_trait]
    impl SignDetector for Sign40 {
        async fn detect(&self, _image: &[u8]) -> Result<Detection, CollaboratorError> {
            Ok(Detection::sign(40.0, 0.95))
        }
    }

    #[tokio::test]
    async fn observer_streams_a_live_run_to_csv() {
        let pipeline =
            Pipeline::new(Arc::new(StaticImagery), Arc::new(Sign40), AuditConfig::default()).unwrap();
        let samples: Vec<SamplePoint> = (0..5).map(|i| point(i, None, false).location).collect();

        let dir: TempDir = tempfile::tempdir().unwrap();
        let mut obs = ReportObserver::new(CsvWriter::new(dir.path()).unwrap(), "Main St");
        let report = pipeline.run(&samples, &mut obs).await.unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(report.summary.discrepancies, 5);

        let mut rdr = csv::Reader::from_path(dir.path().join("analyzed_points.csv")).unwrap();
        let mut indices: Vec<u64> = rdr.records().map(|r| r.unwrap()[0].parse().unwrap()).collect();
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2, 3, 4]);

        let mut rdr = csv::Reader::from_path(dir.path().join("run_summary.csv")).unwrap();
        assert_eq!(rdr.records().count(), 1);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::observer::write_report;
    use crate::sqlite::SqliteWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("report.db").exists());
    }

    #[test]
    fn sqlite_report_rows() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        write_report(&mut w, "Dauphin St", &report()).unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("report.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM analyzed_points", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let flagged: i64 = conn
            .query_row("SELECT COUNT(*) FROM analyzed_points WHERE is_discrepancy = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flagged, 1);
    }

    #[test]
    fn sqlite_missing_values_are_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        write_report(&mut w, "Dauphin St", &report()).unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("report.db")).unwrap();
        let (detected, status): (Option<f64>, String) = conn
            .query_row(
                "SELECT detected_speed, status FROM analyzed_points WHERE idx = 2",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(detected, None);
        assert_eq!(status, "failed");
    }

    #[test]
    fn sqlite_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        write_report(&mut w, "Dauphin St", &report()).unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("report.db")).unwrap();
        let (road, failed, cancelled): (String, i64, i64) = conn
            .query_row(
                "SELECT road, failed, cancelled FROM run_summaries",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(road, "Dauphin St");
        assert_eq!(failed, 1);
        assert_eq!(cancelled, 1);
    }
}
