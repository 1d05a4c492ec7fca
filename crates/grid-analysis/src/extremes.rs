//! Extreme-value extraction.

use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeKind {
    Max,
    Min,
}

/// One extreme cell and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremePoint {
    #[serde(rename = "type")]
    pub kind: ExtremeKind,
    pub value: f64,
    pub lat: f64,
    pub lon: f64,
    pub lat_idx: usize,
    pub lon_idx: usize,
}

/// The `n` largest values (descending) followed by the `n` smallest
/// (ascending) of a field's surface.
///
/// Temporal fields are reduced to their time mean first. NaN cells are
/// ignored and equal values keep their row-major encounter order. Requires
/// `1 <= n < valid cell count`.
pub fn extremes(field: &Field, n: usize) -> AnalysisResult<Vec<ExtremePoint>> {
    let surface = field.surface();
    let grid = surface.grid();

    let mut valid: Vec<(usize, f64)> = surface
        .data()
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .collect();

    if n == 0 || n >= valid.len() {
        return Err(AnalysisError::invalid_argument(format!(
            "n must satisfy 1 <= n < {} valid cells, got {}",
            valid.len(),
            n
        )));
    }

    let to_point = |kind: ExtremeKind, (flat, value): (usize, f64)| {
        let (lat_idx, lon_idx) = grid.unflatten(flat);
        ExtremePoint {
            kind,
            value,
            lat: grid.latitudes()[lat_idx],
            lon: grid.longitudes()[lon_idx],
            lat_idx,
            lon_idx,
        }
    };

    let mut points = Vec::with_capacity(2 * n);

    // sort_by is stable, so ties stay in encounter order
    valid.sort_by(|a, b| b.1.total_cmp(&a.1));
    points.extend(valid.iter().take(n).map(|e| to_point(ExtremeKind::Max, *e)));

    valid.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    points.extend(valid.iter().take(n).map(|e| to_point(ExtremeKind::Min, *e)));

    Ok(points)
}
