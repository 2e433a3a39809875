//! `sa-output` — audit report writers for the speed_audit workspace.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend     | Files created                                 |
//! |-----------|-------------|-----------------------------------------------|
//! | *(none)*  | CSV         | `analyzed_points.csv`, `run_summary.csv`      |
//! | `sqlite`  | SQLite      | `report.db`                                   |
//!
//! All backends implement [`ReportWriter`] and are driven either live by
//! [`ReportObserver`] (an `sa_pipeline::RunObserver`) or after the fact by
//! [`write_report`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use sa_output::{CsvWriter, ReportObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ReportObserver::new(writer, "Dauphin St");
//! pipeline.run(&samples, &mut obs).await?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{ReportObserver, write_report};
pub use row::{AnalyzedPointRow, RunSummaryRow};
pub use writer::ReportWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
