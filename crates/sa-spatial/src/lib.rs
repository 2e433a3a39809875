//! `sa-spatial` — road fragments, path assembly, and arc-length sampling.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`fragment`]  | `Way`, `RoadFragments`                                    |
//! | [`assembler`] | `assemble_path`, `AssembledPath`, `PathPoint`             |
//! | [`sampler`]   | `sample_path`, `SamplePoint`                              |
//! | [`overpass`]  | Overpass JSON parsing and query building                  |
//! | [`names`]     | abbreviation-tolerant street-name matching                |
//! | [`tags`]      | `oneway` / `highway` tag interpretation                   |
//! | [`osm`]       | `load_named_road` (feature = `"osm"` only)                |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.              |

pub mod assembler;
pub mod error;
pub mod fragment;
pub mod names;
pub mod overpass;
pub mod sampler;
pub mod tags;

#[cfg(feature = "osm")]
pub mod osm;


pub use assembler::{AssembledPath, PathPoint, PathWarning, assemble_path};
pub use error::{SpatialError, SpatialResult};
pub use fragment::{RoadFragments, Way};
pub use sampler::{SamplePoint, sample_path};
