//! Common types shared across the climate grid analysis workspace.
//!
//! Coordinate axes, longitude conventions, bounding boxes and the engine's
//! error type live here so that ingestion and analysis crates agree on them.

pub mod bbox;
pub mod error;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{AnalysisError, AnalysisResult};
pub use grid::{
    convert_lon, to_signed, to_unsigned, CoordinateGrid, GeoPoint, GridAxis, LonConvention,
};
