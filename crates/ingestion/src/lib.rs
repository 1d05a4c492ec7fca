//! Climate data ingestion library.
//!
//! Validates external inputs at the boundary so the analysis engine only
//! ever sees well-formed values:
//!
//! - Point tables (JSON records) are schema-checked into `PointSource`s
//! - Labeled datasets have their dimension names mapped to canonical axes
//!   and are turned into `Field`s
//!
//! Every failure is reported as a structured [`IngestionError`]; rows are
//! never skipped silently.

pub mod axis;
pub mod dataset;
pub mod error;
pub mod points;

// Re-exports
pub use axis::{canonical_dims, CanonicalAxis};
pub use dataset::{load_dataset, CoordValues, LabeledDataset, Variable};
pub use error::{IngestionError, Result};
pub use points::{load_point_table, parse_point_records, PointSchema};
