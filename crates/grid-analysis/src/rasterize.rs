//! Binning of irregular point sources onto a regular grid.

use crate::nearest::resolve_point;
use crate::types::{Field, PointSource};
use grid_common::{AnalysisError, AnalysisResult, CoordinateGrid, LonConvention};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Nominal areal footprint of one transmitter, in km².
///
/// A fixed divisor standing in for real propagation physics; override it
/// through `AnalysisConfig::footprint_area_km2`.
pub const DEFAULT_FOOTPRINT_AREA_KM2: f64 = 1.0;

const M2_PER_KM2: f64 = 1.0e6;

/// How point values combine inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accumulation {
    /// Add the point values together.
    #[default]
    Sum,
    /// Count the points, ignoring their values.
    Count,
}

/// Resolution and extent of a regular raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSpec {
    /// Cell spacing in degrees, shared by both axes.
    pub resolution_deg: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub convention: LonConvention,
}

impl RasterSpec {
    /// Whole-globe raster in signed longitudes, endpoints included.
    pub fn global(resolution_deg: f64) -> Self {
        Self {
            resolution_deg,
            lat_min: -90.0,
            lat_max: 90.0,
            lon_min: -180.0,
            lon_max: 180.0,
            convention: LonConvention::Signed180,
        }
    }

    /// Build the ascending axes `min, min + res, ..., max`.
    ///
    /// The upper bound is included when the extent is a whole number of
    /// cells.
    pub fn build(&self) -> AnalysisResult<CoordinateGrid> {
        if !self.resolution_deg.is_finite() || self.resolution_deg <= 0.0 {
            return Err(AnalysisError::invalid_config(format!(
                "raster resolution must be > 0, got {}",
                self.resolution_deg
            )));
        }

        let latitudes = regular_axis(self.lat_min, self.lat_max, self.resolution_deg, "latitude")?;
        let longitudes =
            regular_axis(self.lon_min, self.lon_max, self.resolution_deg, "longitude")?;

        CoordinateGrid::new(latitudes, longitudes, self.convention)
    }
}

fn regular_axis(min: f64, max: f64, res: f64, name: &str) -> AnalysisResult<Vec<f64>> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(AnalysisError::invalid_config(format!(
            "{} extent [{}, {}] is empty",
            name, min, max
        )));
    }

    // tolerance keeps 90.0 / 0.1 from losing its last cell to rounding
    let n = ((max - min) / res + 1e-9).floor() as usize + 1;
    if n < 2 {
        return Err(AnalysisError::invalid_config(format!(
            "resolution {} leaves fewer than 2 {} points in [{}, {}]",
            res, name, min, max
        )));
    }

    Ok((0..n).map(|i| (min + i as f64 * res).min(max)).collect())
}

/// Bin `points` into the nearest cells of `grid`.
///
/// Each point's longitude is converted to the grid's convention before the
/// lookup. Points outside the grid clamp to the edge cell like any other
/// nearest-cell query. Cells that receive no point are exactly 0. Points
/// with a non-finite coordinate or value are skipped.
pub fn rasterize(grid: &CoordinateGrid, points: &[PointSource], accumulation: Accumulation) -> Field {
    let mut data = vec![0.0; grid.len()];
    let mut skipped = 0usize;

    for point in points {
        if !point.is_finite() {
            skipped += 1;
            continue;
        }

        let cell = match resolve_point(grid, &point.location) {
            Ok(cell) => cell,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let flat = grid.flat_index(cell.lat_idx, cell.lon_idx);
        data[flat] += match accumulation {
            Accumulation::Sum => point.value,
            Accumulation::Count => 1.0,
        };
    }

    if skipped > 0 {
        warn!(skipped = skipped, "Skipped point sources with non-finite fields");
    }

    debug!(
        points = points.len() - skipped,
        n_lat = grid.n_lat(),
        n_lon = grid.n_lon(),
        accumulation = ?accumulation,
        "Rasterized point sources"
    );

    let (name, units) = match accumulation {
        Accumulation::Sum => ("point_sum", ""),
        Accumulation::Count => ("point_count", "1"),
    };
    Field::from_parts(name, units, grid.clone(), None, data)
}

/// Rasterize transmitter powers (W) into an areal power density (W/m²).
///
/// Every source is treated as radiating uniformly over `footprint_area_km2`.
pub fn power_density(
    grid: &CoordinateGrid,
    points: &[PointSource],
    footprint_area_km2: f64,
) -> AnalysisResult<Field> {
    if !footprint_area_km2.is_finite() || footprint_area_km2 <= 0.0 {
        return Err(AnalysisError::invalid_config(format!(
            "footprint area must be > 0 km², got {}",
            footprint_area_km2
        )));
    }

    let area_m2 = footprint_area_km2 * M2_PER_KM2;
    let scaled: Vec<PointSource> = points
        .iter()
        .map(|p| PointSource {
            value: p.value / area_m2,
            ..p.clone()
        })
        .collect();

    Ok(rasterize(grid, &scaled, Accumulation::Sum).renamed("rf_power_density", "W/m²"))
}
