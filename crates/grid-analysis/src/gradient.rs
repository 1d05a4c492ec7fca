//! Finite-difference gradients over non-uniform axes.

use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult, CoordinateGrid, GridAxis};
use serde::{Deserialize, Serialize};

/// Derivative of `values` with respect to `coords`.
///
/// Interior points use the second-order central difference for non-uniform
/// spacing; the two boundary points use one-sided first-order differences.
/// Both slices must have the same length of at least 2.
pub fn gradient_1d(values: &[f64], coords: &[f64]) -> Vec<f64> {
    let n = values.len();
    debug_assert_eq!(n, coords.len());
    debug_assert!(n >= 2);

    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / (coords[1] - coords[0]);
    out[n - 1] = (values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]);

    for i in 1..n - 1 {
        let h1 = coords[i] - coords[i - 1];
        let h2 = coords[i + 1] - coords[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        out[i] = a * values[i - 1] + b * values[i] + c * values[i + 1];
    }

    out
}

fn check_slice(slice: &[f64], grid: &CoordinateGrid) -> AnalysisResult<()> {
    if slice.len() != grid.len() {
        return Err(AnalysisError::invalid_argument(format!(
            "slice has {} values, grid {:?} needs {}",
            slice.len(),
            grid.shape(),
            grid.len()
        )));
    }
    Ok(())
}

/// Gradient of a lat x lon slice along one axis, in value units per degree.
pub fn gradient(slice: &[f64], grid: &CoordinateGrid, axis: GridAxis) -> AnalysisResult<Vec<f64>> {
    check_slice(slice, grid)?;
    let (n_lat, n_lon) = grid.shape();
    let mut out = vec![0.0; slice.len()];

    match axis {
        GridAxis::Longitude => {
            for (row, out_row) in slice.chunks(n_lon).zip(out.chunks_mut(n_lon)) {
                out_row.copy_from_slice(&gradient_1d(row, grid.longitudes()));
            }
        }
        GridAxis::Latitude => {
            let mut column = vec![0.0; n_lat];
            for lon_idx in 0..n_lon {
                for (lat_idx, v) in column.iter_mut().enumerate() {
                    *v = slice[lat_idx * n_lon + lon_idx];
                }
                for (lat_idx, g) in gradient_1d(&column, grid.latitudes()).into_iter().enumerate() {
                    out[lat_idx * n_lon + lon_idx] = g;
                }
            }
        }
    }

    Ok(out)
}

/// Per-cell magnitude `sqrt(d/dlat² + d/dlon²)`.
pub fn gradient_magnitude(slice: &[f64], grid: &CoordinateGrid) -> AnalysisResult<Vec<f64>> {
    let d_lat = gradient(slice, grid, GridAxis::Latitude)?;
    let d_lon = gradient(slice, grid, GridAxis::Longitude)?;
    Ok(d_lat
        .iter()
        .zip(&d_lon)
        .map(|(a, b)| a.hypot(*b))
        .collect())
}

/// Gradient of a field's surface (time mean when temporal) as a new field.
pub fn gradient_field(field: &Field, axis: GridAxis) -> AnalysisResult<Field> {
    let surface = field.surface();
    let data = gradient(surface.data(), surface.grid(), axis)?;
    let units = if field.units().is_empty() {
        "1/deg".to_string()
    } else {
        format!("{}/deg", field.units())
    };

    Field::new(
        format!("{}_d_{}", field.name(), axis),
        units,
        surface.grid().clone(),
        data,
    )
}

/// Zonal-mean profile of a field and its meridional gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatitudinalProfile {
    pub latitudes: Vec<f64>,
    /// NaN-aware mean over longitude (and time) at each latitude.
    pub values: Vec<f64>,
    /// `d values / d latitude`, per degree.
    pub gradient: Vec<f64>,
}

/// Average a field over longitude at each latitude and differentiate the
/// resulting profile.
pub fn latitudinal_profile(field: &Field) -> LatitudinalProfile {
    let surface = field.surface();
    let grid = surface.grid();

    let values: Vec<f64> = surface
        .data()
        .chunks(grid.n_lon())
        .map(|row| {
            let (sum, count) = row
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect();

    let gradient = gradient_1d(&values, grid.latitudes());

    LatitudinalProfile {
        latitudes: grid.latitudes().to_vec(),
        values,
        gradient,
    }
}
