//! `sa-core` — foundational types for the `speed_audit` workspace.
//!
//! This crate is a dependency of every other `sa-*` crate.  It intentionally
//! has no `sa-*` dependencies and minimal external ones (`thiserror`, `serde`
//! and `serde_json` for configuration files).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `WayId`                                          |
//! | [`geo`]     | `GeoPoint`, haversine distance, bearing, destination       |
//! | [`units`]   | `SpeedUnit`, `RecordedSpeed`, `CountryProfile`             |
//! | [`config`]  | `AuditConfig`, `RetryConfig`                               |
//! | [`error`]   | `CoreError`, `CoreResult`                                  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AuditConfig, RetryConfig, MAX_CONCURRENCY, MIN_INTERVAL_M};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{NodeId, WayId};
pub use units::{CountryProfile, RecordedSpeed, SpeedUnit, TrafficSide};
