//! NaN-aware summary statistics.

use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult, BoundingBox};
use serde::{Deserialize, Serialize};

/// Scalar summary of a value set after NaN removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q25: f64,
    pub q75: f64,
    /// Number of non-NaN values.
    pub count: usize,
}

impl StatisticsRecord {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}

fn sorted_valid(values: &[f64]) -> Vec<f64> {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    valid.sort_by(f64::total_cmp);
    valid
}

/// Linear-interpolated percentile of already sorted, NaN-free values.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Summarize `values`, ignoring NaN.
///
/// Fails with `EmptyData` when no valid value remains.
pub fn summary(values: &[f64]) -> AnalysisResult<StatisticsRecord> {
    let sorted = sorted_valid(values);
    if sorted.is_empty() {
        return Err(AnalysisError::empty_data(format!(
            "all {} values are NaN",
            values.len()
        )));
    }

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Ok(StatisticsRecord {
        name: None,
        mean,
        std: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
        median: percentile_sorted(&sorted, 50.0),
        q25: percentile_sorted(&sorted, 25.0),
        q75: percentile_sorted(&sorted, 75.0),
        count,
    })
}

/// Summary over every value of a field, named after it.
pub fn field_summary(field: &Field) -> AnalysisResult<StatisticsRecord> {
    Ok(summary(field.data())?.with_name(field.name()))
}

/// The `q`-th percentile (0..=100) of `values`, ignoring NaN.
pub fn percentile(values: &[f64], q: f64) -> AnalysisResult<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(AnalysisError::invalid_argument(format!(
            "percentile must be within [0, 100], got {}",
            q
        )));
    }

    let sorted = sorted_valid(values);
    if sorted.is_empty() {
        return Err(AnalysisError::empty_data("no valid values for percentile"));
    }

    Ok(percentile_sorted(&sorted, q))
}

/// Summary over the cells of `field` inside `bbox` (in the grid's
/// longitude convention), across all time steps.
pub fn regional_summary(field: &Field, bbox: &BoundingBox) -> AnalysisResult<StatisticsRecord> {
    let grid = field.grid();
    let mask: Vec<bool> = grid
        .latitudes()
        .iter()
        .flat_map(|lat| grid.longitudes().iter().map(move |lon| bbox.contains(*lon, *lat)))
        .collect();

    let values: Vec<f64> = field
        .slices()
        .flat_map(|slice| {
            slice
                .iter()
                .zip(&mask)
                .filter(|(_, inside)| **inside)
                .map(|(v, _)| *v)
        })
        .collect();

    if values.is_empty() {
        return Err(AnalysisError::empty_data(format!(
            "no cells of {} fall inside {:?}",
            field.name(),
            bbox
        )));
    }

    Ok(summary(&values)?.with_name(field.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::{CoordinateGrid, LonConvention};

    #[test]
    fn test_summary_drops_nan() {
        let record = summary(&[1.0, f64::NAN, 2.0, 3.0, 4.0, f64::NAN]).unwrap();
        assert_eq!(record.count, 4);
        assert!((record.mean - 2.5).abs() < 1e-12);
        assert!((record.std - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(record.min, 1.0);
        assert_eq!(record.max, 4.0);
        assert!((record.median - 2.5).abs() < 1e-12);
        assert!((record.q25 - 1.75).abs() < 1e-12);
        assert!((record.q75 - 3.25).abs() < 1e-12);
        assert!((record.iqr() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_all_nan_is_empty_data() {
        let err = summary(&[f64::NAN, f64::NAN]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyData(_)));
        assert!(summary(&[]).is_err());
    }

    #[test]
    fn test_percentile() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert!((percentile(&values, 90.0).unwrap() - 9.1).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 10.0);

        let err = percentile(&values, 101.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidArgument(_)));
    }

    #[test]
    fn test_regional_summary() {
        let grid = CoordinateGrid::new(
            vec![35.0, 40.0, 45.0],
            vec![-10.0, 0.0, 10.0],
            LonConvention::Signed180,
        )
        .unwrap();
        let field = Field::new("t2m", "K", grid, (0..9).map(|v| v as f64).collect()).unwrap();

        let bbox = BoundingBox::from_region(36.0, 46.0, -5.0, 15.0);
        let record = regional_summary(&field, &bbox).unwrap();
        // cells (40, 0), (40, 10), (45, 0), (45, 10)
        assert_eq!(record.count, 4);
        assert!((record.mean - 6.0).abs() < 1e-12);
        assert_eq!(record.name.as_deref(), Some("t2m"));

        let outside = BoundingBox::from_region(60.0, 70.0, 0.0, 1.0);
        assert!(matches!(
            regional_summary(&field, &outside),
            Err(AnalysisError::EmptyData(_))
        ));
    }
}
