//! Grid analysis and correlation engine.
//!
//! Turns irregular point sources and regular reanalysis grids into
//! comparable fields, then computes statistics, gradients, extremes and
//! correlations over them. Every operation is a pure function of its
//! arguments: fields are immutable and each transform returns a new one.
//!
//! # Architecture
//!
//! ```text
//! PointSource[] ──► rasterize / power_density ──► Field (points grid)
//!                                                     │
//! Field (reanalysis) ──► time_mean ──────────┐        │
//!        │                                   ▼        ▼
//!        │                              interpolate_converted
//!        │                                        │
//!        │                                        ▼
//!        │                              correlate / correlation_matrix
//!        │
//!        ├─► summary / percentile / regional_summary
//!        ├─► gradient / latitudinal_profile / extremes
//!        └─► extract_point_series ──► partition / rolling_mean
//! ```
//!
//! Longitudes are always interpreted in an explicit convention. Point
//! coordinates carry their own tag ([`GeoPoint`]) and are converted to the
//! grid's convention by [`resolve_point`] and the rasterizer; plain
//! [`resolve`] never converts.
//!
//! # Example
//!
//! ```ignore
//! use grid_analysis::{power_density, correlate_fields, RasterSpec};
//!
//! let grid = RasterSpec::global(0.1).build()?;
//! let rf = power_density(&grid, &transmitters, 1.0)?;
//! if let Some(result) = correlate_fields(&rf, &temperature)? {
//!     println!("r = {:.3}", result.r);
//! }
//! ```

pub mod compare;
pub mod config;
pub mod correlation;
pub mod downsample;
pub mod extremes;
pub mod forcing;
pub mod gradient;
pub mod interpolation;
pub mod nearest;
pub mod rasterize;
pub mod stats;
pub mod timeseries;
pub mod types;

// Re-export commonly used types at crate root
pub use compare::{
    difference, impact_summary, point_contrast, HeatIslandSignal, ImpactLevel, ImpactSummary,
    PointContrast,
};
pub use config::AnalysisConfig;
pub use correlation::{
    correlate, correlate_fields, correlate_named, correlation_matrix, field_correlation_matrix,
    CorrelationMatrix, CorrelationPair, CorrelationResult, MIN_CORRELATION_SAMPLES,
};
pub use downsample::{coarsen, DownsampleMethod};
pub use extremes::{extremes, ExtremeKind, ExtremePoint};
pub use forcing::{estimate_radiative_forcing, ForcingEstimate, Significance};
pub use gradient::{
    gradient, gradient_1d, gradient_field, gradient_magnitude, latitudinal_profile,
    LatitudinalProfile,
};
pub use interpolation::{
    bilinear_at, interpolate, interpolate_converted, interpolate_with, InterpolationMethod,
};
pub use nearest::{nearest_index, resolve, resolve_point};
pub use rasterize::{power_density, rasterize, Accumulation, RasterSpec, DEFAULT_FOOTPRINT_AREA_KM2};
pub use stats::{field_summary, percentile, regional_summary, summary, StatisticsRecord};
pub use timeseries::{
    extract_point_series, extract_point_series_at, spatial_mean_series, DiurnalPartition,
    HourWindow, SeriesPoint, TimeSeries, KELVIN_TO_CELSIUS,
};
pub use types::{Field, FieldInfo, PointAttributes, PointSource, ResolvedCell};

pub use grid_common::{
    AnalysisError, AnalysisResult, BoundingBox, CoordinateGrid, GeoPoint, GridAxis, LonConvention,
};
