//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `report.db` file in the configured output directory with
//! two tables: `analyzed_points` and `run_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::{AnalyzedPointRow, OutputResult, RunSummaryRow};
use crate::writer::ReportWriter;

/// Writes audit output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `report.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("report.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS analyzed_points (
                 idx            INTEGER NOT NULL,
                 lat            REAL    NOT NULL,
                 lon            REAL    NOT NULL,
                 distance_m     REAL    NOT NULL,
                 heading        REAL    NOT NULL,
                 way_id         INTEGER,
                 recorded_speed TEXT,
                 detected_speed REAL,
                 confidence     REAL,
                 is_discrepancy INTEGER NOT NULL,
                 status         TEXT    NOT NULL,
                 image_date     TEXT,
                 error          TEXT
             );
             CREATE TABLE IF NOT EXISTS run_summaries (
                 road          TEXT    NOT NULL,
                 total         INTEGER NOT NULL,
                 analyzed      INTEGER NOT NULL,
                 discrepancies INTEGER NOT NULL,
                 failed        INTEGER NOT NULL,
                 skipped       INTEGER NOT NULL,
                 cancelled     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl ReportWriter for SqliteWriter {
    fn write_point(&mut self, row: &AnalyzedPointRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO analyzed_points \
             (idx, lat, lon, distance_m, heading, way_id, recorded_speed, detected_speed, \
              confidence, is_discrepancy, status, image_date, error) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        stmt.execute(rusqlite::params![
            row.index as i64,
            row.lat,
            row.lon,
            row.distance_m,
            row.heading,
            row.way_id,
            row.recorded_speed,
            row.detected_speed,
            row.confidence,
            row.is_discrepancy as i64,
            row.status,
            row.image_date,
            row.error,
        ])?;
        Ok(())
    }

    fn write_summary(&mut self, row: &RunSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO run_summaries \
             (road, total, analyzed, discrepancies, failed, skipped, cancelled) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.road,
                row.total as i64,
                row.analyzed as i64,
                row.discrepancies as i64,
                row.failed as i64,
                row.skipped as i64,
                row.cancelled as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
