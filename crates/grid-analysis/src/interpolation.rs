//! Interpolation methods for cross-grid resampling.
//!
//! Resampling never extrapolates: target coordinates outside the source
//! axis range come back as NaN. Source and target grids are expected to
//! share a longitude convention; a mismatch is logged but not corrected.

use crate::nearest::nearest_index;
use crate::types::Field;
use grid_common::{convert_lon, CoordinateGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Interpolation method for grid resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Value of the nearest source cell (inside the source range only).
    Nearest,
    /// Weighted blend of the four surrounding source cells.
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive), defaulting to `Bilinear`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::Bilinear,
        }
    }
}

/// Position of `x` between two neighbouring axis values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lower: usize,
    /// Fraction of the way from `axis[lower]` to `axis[lower + 1]`.
    frac: f64,
}

/// Locate `x` on a monotonic axis. `None` outside the axis range or for NaN.
///
/// A value sitting exactly on an interior node brackets it as the lower
/// corner with `frac == 0`, so the next node is still read.
fn bracket(axis: &[f64], x: f64) -> Option<Bracket> {
    let n = axis.len();
    let first = axis[0];
    let last = axis[n - 1];
    let ascending = last > first;
    let (lo, hi) = if ascending { (first, last) } else { (last, first) };

    if !(x >= lo && x <= hi) {
        return None;
    }

    let upper = if ascending {
        axis.partition_point(|v| *v <= x)
    } else {
        axis.partition_point(|v| *v >= x)
    };
    let lower = upper.saturating_sub(1).min(n - 2);
    let frac = (x - axis[lower]) / (axis[lower + 1] - axis[lower]);

    Some(Bracket { lower, frac })
}

fn bilinear(slice: &[f64], n_lon: usize, lat: Bracket, lon: Bracket) -> f64 {
    let y0 = lat.lower;
    let x0 = lon.lower;

    let v00 = slice[y0 * n_lon + x0];
    let v10 = slice[y0 * n_lon + x0 + 1];
    let v01 = slice[(y0 + 1) * n_lon + x0];
    let v11 = slice[(y0 + 1) * n_lon + x0 + 1];

    // Any NaN corner poisons the cell
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f64::NAN;
    }

    let top = v00 * (1.0 - lon.frac) + v10 * lon.frac;
    let bottom = v01 * (1.0 - lon.frac) + v11 * lon.frac;
    top * (1.0 - lat.frac) + bottom * lat.frac
}

/// Bilinearly sample one lat x lon slice at `(lat, lon)`.
///
/// `lon` must be in the grid's convention. Returns NaN outside the grid.
///
/// All four corners of the enclosing cell are read even when the query lies
/// exactly on a node, so a NaN neighbour with zero weight still yields NaN.
/// This matches scipy's `interpn`.
pub fn bilinear_at(slice: &[f64], grid: &CoordinateGrid, lat: f64, lon: f64) -> f64 {
    match (
        bracket(grid.latitudes(), lat),
        bracket(grid.longitudes(), lon),
    ) {
        (Some(lat), Some(lon)) => bilinear(slice, grid.n_lon(), lat, lon),
        _ => f64::NAN,
    }
}

/// Resample `source` onto `target` with bilinear interpolation.
pub fn interpolate(source: &Field, target: &CoordinateGrid) -> Field {
    interpolate_with(source, target, InterpolationMethod::Bilinear)
}

/// Resample `source` onto the axes of `target`.
///
/// Temporal fields are resampled slice by slice and keep their time axis.
/// Target longitudes are used as given; see [`interpolate_converted`] for
/// grids in different conventions.
pub fn interpolate_with(
    source: &Field,
    target: &CoordinateGrid,
    method: InterpolationMethod,
) -> Field {
    let grid = source.grid();
    if grid.convention() != target.convention() {
        warn!(
            field = source.name(),
            source_convention = %grid.convention(),
            target_convention = %target.convention(),
            "Interpolating across longitude conventions; convert the source grid first"
        );
    }
    resample(source, target, target.longitudes().to_vec(), method)
}

/// Resample `source` onto `target`, converting each target longitude into
/// the source grid's convention before sampling.
///
/// Unlike reordering the source grid with `Field::to_convention`, this works
/// for axes that include both ends of the range (e.g. -180 and 180).
pub fn interpolate_converted(
    source: &Field,
    target: &CoordinateGrid,
    method: InterpolationMethod,
) -> Field {
    let from = target.convention();
    let to = source.grid().convention();
    let lons = target
        .longitudes()
        .iter()
        .map(|lon| convert_lon(*lon, from, to))
        .collect();
    resample(source, target, lons, method)
}

/// Sample `source` at `target`'s latitudes and at `query_lons`, which are
/// expressed in the source convention and parallel to `target`'s longitudes.
fn resample(
    source: &Field,
    target: &CoordinateGrid,
    query_lons: Vec<f64>,
    method: InterpolationMethod,
) -> Field {
    let grid = source.grid();

    let lat_brackets: Vec<Option<Bracket>> = target
        .latitudes()
        .iter()
        .map(|lat| bracket(grid.latitudes(), *lat))
        .collect();
    let lon_brackets: Vec<Option<Bracket>> = query_lons
        .iter()
        .map(|lon| bracket(grid.longitudes(), *lon))
        .collect();

    let mut data = Vec::with_capacity(source.n_times() * target.len());
    for slice in source.slices() {
        for (lat_idx, lat_b) in lat_brackets.iter().enumerate() {
            for (lon_idx, lon_b) in lon_brackets.iter().enumerate() {
                let value = match (lat_b, lon_b) {
                    (Some(lat_b), Some(lon_b)) => match method {
                        InterpolationMethod::Bilinear => {
                            bilinear(slice, grid.n_lon(), *lat_b, *lon_b)
                        }
                        InterpolationMethod::Nearest => match (
                            nearest_index(grid.latitudes(), target.latitudes()[lat_idx]),
                            nearest_index(grid.longitudes(), query_lons[lon_idx]),
                        ) {
                            (Some(y), Some(x)) => slice[grid.flat_index(y, x)],
                            _ => f64::NAN,
                        },
                    },
                    _ => f64::NAN,
                };
                data.push(value);
            }
        }
    }

    let covered = lat_brackets.iter().filter(|b| b.is_some()).count()
        * lon_brackets.iter().filter(|b| b.is_some()).count();
    debug!(
        field = source.name(),
        method = ?method,
        target_shape = ?target.shape(),
        covered_cells = covered,
        "Interpolated field onto target grid"
    );

    Field::from_parts(
        source.name(),
        source.units(),
        target.clone(),
        source.times().map(|t| t.to_vec()),
        data,
    )
}
