//! Block coarsening of fields.
//!
//! Reduces grid resolution by an integer factor so that large grids can be
//! brought down to a manageable size before correlation or rasterization
//! comparisons.

use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult, CoordinateGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Method used to aggregate a block of cells.
///
/// - **Mean**: continuous data (temperature, humidity, power density)
/// - **Max**: peak data (precipitation)
/// - **Nearest**: first cell of the block, preserves exact values
/// - **Sum**: extensive quantities (source counts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMethod {
    #[default]
    Mean,
    Max,
    Nearest,
    Sum,
}

impl DownsampleMethod {
    /// Parse from string (case-insensitive), defaulting to `Mean`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "max" => Self::Max,
            "nearest" => Self::Nearest,
            "sum" => Self::Sum,
            _ => Self::Mean,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Nearest => "nearest",
            Self::Sum => "sum",
        }
    }
}

impl std::fmt::Display for DownsampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarsen `field` by aggregating `factor` x `factor` blocks.
///
/// Trailing rows/columns that do not fill a whole block are dropped. The new
/// axis values are the means of each block's coordinates. NaN cells are
/// ignored inside a block; an all-NaN block yields NaN.
pub fn coarsen(field: &Field, factor: usize, method: DownsampleMethod) -> AnalysisResult<Field> {
    let grid = field.grid();
    if factor == 0 {
        return Err(AnalysisError::invalid_config("coarsen factor must be > 0"));
    }
    if factor == 1 {
        return Ok(field.clone());
    }

    let new_lat = grid.n_lat() / factor;
    let new_lon = grid.n_lon() / factor;
    if new_lat < 2 || new_lon < 2 {
        return Err(AnalysisError::invalid_config(format!(
            "factor {} leaves fewer than 2 points on an axis of grid {:?}",
            factor,
            grid.shape()
        )));
    }

    let latitudes = block_means(grid.latitudes(), factor, new_lat);
    let longitudes = block_means(grid.longitudes(), factor, new_lon);
    let coarse = CoordinateGrid::new(latitudes, longitudes, grid.convention())?;

    let mut data = Vec::with_capacity(field.n_times() * coarse.len());
    let mut block = Vec::with_capacity(factor * factor);
    for slice in field.slices() {
        for out_y in 0..new_lat {
            for out_x in 0..new_lon {
                block.clear();
                for dy in 0..factor {
                    let row = (out_y * factor + dy) * grid.n_lon();
                    let start = row + out_x * factor;
                    block.extend_from_slice(&slice[start..start + factor]);
                }
                data.push(aggregate(&block, method));
            }
        }
    }

    debug!(
        field = field.name(),
        factor = factor,
        method = %method,
        from = ?grid.shape(),
        to = ?coarse.shape(),
        "Coarsened field"
    );

    Ok(Field::from_parts(
        field.name(),
        field.units(),
        coarse,
        field.times().map(|t| t.to_vec()),
        data,
    ))
}

fn block_means(axis: &[f64], factor: usize, n: usize) -> Vec<f64> {
    axis.chunks_exact(factor)
        .take(n)
        .map(|chunk| chunk.iter().sum::<f64>() / factor as f64)
        .collect()
}

fn aggregate(block: &[f64], method: DownsampleMethod) -> f64 {
    if method == DownsampleMethod::Nearest {
        return block[0];
    }

    let mut valid = block.iter().copied().filter(|v| !v.is_nan()).peekable();
    if valid.peek().is_none() {
        return f64::NAN;
    }

    match method {
        DownsampleMethod::Max => valid.fold(f64::NEG_INFINITY, f64::max),
        DownsampleMethod::Sum => valid.sum(),
        _ => {
            let (sum, count) = valid.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            sum / count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::LonConvention;
    use test_utils::{create_index_values, create_test_grid, hourly_times, reference_start};

    fn field_4x4() -> Field {
        let grid = CoordinateGrid::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![10.0, 11.0, 12.0, 13.0],
            LonConvention::Signed180,
        )
        .unwrap();
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        Field::new("v", "K", grid, data).unwrap()
    }

    #[test]
    fn test_coarsen_mean() {
        let out = coarsen(&field_4x4(), 2, DownsampleMethod::Mean).unwrap();
        assert_eq!(out.grid().latitudes(), &[0.5, 2.5]);
        assert_eq!(out.grid().longitudes(), &[10.5, 12.5]);
        // block 0: 0, 1, 4, 5
        assert_eq!(out.data(), &[2.5, 4.5, 10.5, 12.5]);
    }

    #[test]
    fn test_coarsen_max_sum_nearest() {
        let field = field_4x4();
        let max = coarsen(&field, 2, DownsampleMethod::Max).unwrap();
        assert_eq!(max.data(), &[5.0, 7.0, 13.0, 15.0]);

        let sum = coarsen(&field, 2, DownsampleMethod::Sum).unwrap();
        assert_eq!(sum.data()[0], 10.0);

        let nearest = coarsen(&field, 2, DownsampleMethod::Nearest).unwrap();
        assert_eq!(nearest.data(), &[0.0, 2.0, 8.0, 10.0]);
    }

    #[test]
    fn test_coarsen_ignores_nan() {
        let grid = CoordinateGrid::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![0.0, 1.0, 2.0, 3.0],
            LonConvention::Signed180,
        )
        .unwrap();
        let mut data = vec![1.0; 16];
        data[0] = f64::NAN;
        data[2] = f64::NAN;
        data[3] = f64::NAN;
        data[6] = f64::NAN;
        data[7] = f64::NAN;
        let field = Field::new("v", "", grid, data).unwrap();

        let out = coarsen(&field, 2, DownsampleMethod::Mean).unwrap();
        assert_eq!(out.data()[0], 1.0);
        assert!(out.data()[1].is_nan());
    }

    #[test]
    fn test_coarsen_temporal_field_per_slice() {
        let grid = create_test_grid(0.0, 10.0, 1.0, 4, 4, LonConvention::Signed180);
        let first = create_index_values(4, 4);
        let data: Vec<f64> = first
            .iter()
            .copied()
            .chain(first.iter().map(|v| v * 2.0))
            .collect();
        let times = hourly_times(reference_start(), 2);
        let field = Field::with_times("v", "K", grid, times.clone(), data).unwrap();

        let out = coarsen(&field, 2, DownsampleMethod::Mean).unwrap();
        assert_eq!(out.n_times(), 2);
        assert_eq!(out.times(), Some(times.as_slice()));
        assert_eq!(out.grid().shape(), (2, 2));
        // block 0 on slice 0: 0, 1, 1000, 1001
        assert_eq!(out.slice(0).unwrap(), &[500.5, 502.5, 2500.5, 2502.5]);
        assert_eq!(out.slice(1).unwrap(), &[1001.0, 1005.0, 5001.0, 5005.0]);
    }

    #[test]
    fn test_coarsen_rejects_bad_factor() {
        let err = coarsen(&field_4x4(), 0, DownsampleMethod::Mean).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
        let err = coarsen(&field_4x4(), 3, DownsampleMethod::Mean).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(DownsampleMethod::from_str("MAX"), DownsampleMethod::Max);
        assert_eq!(DownsampleMethod::from_str("sum"), DownsampleMethod::Sum);
        assert_eq!(DownsampleMethod::from_str("median"), DownsampleMethod::Mean);
        assert_eq!(DownsampleMethod::Nearest.to_string(), "nearest");
    }
}
