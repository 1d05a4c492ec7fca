//! Nearest-cell resolution.
//!
//! Each axis is searched independently for the value closest to the query
//! coordinate. On non-uniform grids this per-axis answer can differ from the
//! true 2-D nearest grid point; every point extraction in this crate relies
//! on the per-axis behavior.

use crate::types::ResolvedCell;
use grid_common::{AnalysisError, AnalysisResult, CoordinateGrid, GeoPoint};

/// Index of the axis value closest to `value`.
///
/// Ties resolve to the lowest index. Values beyond either end of the axis,
/// infinities included, clamp to that end. `None` for NaN or an empty axis.
pub fn nearest_index(axis: &[f64], value: f64) -> Option<usize> {
    if value.is_nan() || axis.is_empty() {
        return None;
    }

    if value.is_infinite() {
        let extreme = axis.iter().enumerate().reduce(|best, cur| {
            let further = if value > 0.0 { cur.1 > best.1 } else { cur.1 < best.1 };
            if further {
                cur
            } else {
                best
            }
        });
        return extreme.map(|(i, _)| i);
    }

    let mut best = 0;
    let mut best_diff = f64::INFINITY;

    for (i, v) in axis.iter().enumerate() {
        let diff = (v - value).abs();
        // strict comparison keeps the first of equal distances
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }

    Some(best)
}

/// Resolve `(lat, lon)` to the nearest cell of `grid`.
///
/// `lon` must already be in the grid's longitude convention; no conversion
/// happens here. Use [`resolve_point`] for tagged coordinates. Queries
/// outside the grid, infinite ones included, are clamped to the edge: check
/// [`CoordinateGrid::contains`] first when that matters. A NaN coordinate is
/// an `InvalidArgument` error.
pub fn resolve(grid: &CoordinateGrid, lat: f64, lon: f64) -> AnalysisResult<ResolvedCell> {
    let (lat_idx, lon_idx) = match (
        nearest_index(grid.latitudes(), lat),
        nearest_index(grid.longitudes(), lon),
    ) {
        (Some(lat_idx), Some(lon_idx)) => (lat_idx, lon_idx),
        _ => {
            return Err(AnalysisError::invalid_argument(format!(
                "cannot resolve ({}, {}) on the grid",
                lat, lon
            )))
        }
    };

    let cell_lat = grid.latitudes()[lat_idx];
    let cell_lon = grid.longitudes()[lon_idx];
    let snap_distance = ((cell_lat - lat).powi(2) + (cell_lon - lon).powi(2)).sqrt();

    Ok(ResolvedCell {
        lat_idx,
        lon_idx,
        lat: cell_lat,
        lon: cell_lon,
        snap_distance,
    })
}

/// Resolve a tagged point, converting its longitude to the grid's
/// convention first.
pub fn resolve_point(grid: &CoordinateGrid, point: &GeoPoint) -> AnalysisResult<ResolvedCell> {
    resolve(grid, point.lat, point.lon_in(grid.convention()))
}
