//! Pairwise Pearson correlation with NaN-pair removal.
//!
//! Too few paired samples is an expected outcome here, not a fault: it is
//! reported as `Ok(None)` (or NaN inside a matrix) so callers can show
//! "not enough data" instead of failing.

use crate::interpolation::{interpolate_converted, InterpolationMethod};
use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fewest valid pairs for which a coefficient is reported.
pub const MIN_CORRELATION_SAMPLES: usize = 10;

/// Pearson coefficient and least-squares line `b = slope * a + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub variable_a: String,
    pub variable_b: String,
    /// Pearson r, within [-1, 1].
    pub r: f64,
    pub slope: f64,
    pub intercept: f64,
    /// Pairs left after dropping non-finite values.
    pub n_samples: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    pub std_a: f64,
    pub std_b: f64,
}

/// Correlate two paired series labelled `"a"` and `"b"`.
pub fn correlate(a: &[f64], b: &[f64]) -> AnalysisResult<Option<CorrelationResult>> {
    correlate_named("a", a, "b", b)
}

/// Correlate two paired series.
///
/// A position is dropped when either series is NaN or infinite there.
/// Returns `None`
/// when fewer than [`MIN_CORRELATION_SAMPLES`] pairs remain or when either
/// series is constant over the remaining pairs. Series of different lengths
/// are an `InvalidArgument` error.
pub fn correlate_named(
    name_a: &str,
    a: &[f64],
    name_b: &str,
    b: &[f64],
) -> AnalysisResult<Option<CorrelationResult>> {
    if a.len() != b.len() {
        return Err(AnalysisError::invalid_argument(format!(
            "cannot pair {} ({} values) with {} ({} values)",
            name_a,
            a.len(),
            name_b,
            b.len()
        )));
    }

    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();

    let n = pairs.len();
    if n < MIN_CORRELATION_SAMPLES {
        debug!(
            a = name_a,
            b = name_b,
            samples = n,
            "Too few valid pairs to correlate"
        );
        return Ok(None);
    }

    let nf = n as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        debug!(a = name_a, b = name_b, "Constant series, correlation undefined");
        return Ok(None);
    }

    let r = (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0);
    let slope = cov / var_a;

    Ok(Some(CorrelationResult {
        variable_a: name_a.to_string(),
        variable_b: name_b.to_string(),
        r,
        slope,
        intercept: mean_b - slope * mean_a,
        n_samples: n,
        mean_a,
        mean_b,
        std_a: (var_a / nf).sqrt(),
        std_b: (var_b / nf).sqrt(),
    }))
}

/// Symmetric matrix of pairwise coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major `labels.len()` x `labels.len()`; NaN where undefined.
    pub values: Vec<f64>,
}

/// An unordered pair of variables and their coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub a: String,
    pub b: String,
    pub r: f64,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Coefficient between two labels, if both exist.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i * self.size() + j])
    }

    /// Off-diagonal pairs with a defined coefficient, strongest |r| first.
    pub fn strongest_pairs(&self) -> Vec<CorrelationPair> {
        let n = self.size();
        let mut pairs: Vec<CorrelationPair> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter_map(|(i, j)| {
                let r = self.values[i * n + j];
                (!r.is_nan()).then(|| CorrelationPair {
                    a: self.labels[i].clone(),
                    b: self.labels[j].clone(),
                    r,
                })
            })
            .collect();

        pairs.sort_by(|x, y| y.r.abs().total_cmp(&x.r.abs()));
        pairs
    }
}

/// Pairwise correlation of every named series.
///
/// Pairs that are too short, constant or of mismatched length get NaN
/// instead of failing the whole matrix.
pub fn correlation_matrix<S, V>(named: &[(S, V)]) -> CorrelationMatrix
where
    S: AsRef<str>,
    V: AsRef<[f64]>,
{
    let n = named.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        for j in i..n {
            let (name_a, a): (&str, &[f64]) = (named[i].0.as_ref(), named[i].1.as_ref());
            let (name_b, b): (&str, &[f64]) = (named[j].0.as_ref(), named[j].1.as_ref());

            let r = match correlate_named(name_a, a, name_b, b) {
                Ok(Some(result)) => result.r,
                Ok(None) => f64::NAN,
                Err(e) => {
                    warn!(error = %e, "Skipping correlation pair");
                    f64::NAN
                }
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix {
        labels: named
            .iter()
            .map(|(s, _)| AsRef::<str>::as_ref(s).to_string())
            .collect(),
        values,
    }
}

/// Correlation matrix over the surfaces (time means) of fields sharing one
/// grid. Fields on different grids are an `InvalidArgument` error.
pub fn field_correlation_matrix(fields: &[Field]) -> AnalysisResult<CorrelationMatrix> {
    if let Some(first) = fields.first() {
        if let Some(other) = fields.iter().find(|f| f.grid() != first.grid()) {
            return Err(AnalysisError::invalid_argument(format!(
                "{} and {} are on different grids; interpolate first",
                first.name(),
                other.name()
            )));
        }
    }

    let named: Vec<(String, Vec<f64>)> = fields
        .iter()
        .map(|f| (f.name().to_string(), f.surface().data().to_vec()))
        .collect();
    Ok(correlation_matrix(&named))
}

/// Correlate a field with a reference field on the reference's grid.
///
/// Both fields are reduced to their time means, `field` is bilinearly
/// interpolated onto `reference`'s grid (converting longitudes explicitly
/// when the conventions differ), and the cells are correlated pairwise.
pub fn correlate_fields(
    field: &Field,
    reference: &Field,
) -> AnalysisResult<Option<CorrelationResult>> {
    let a = interpolate_converted(
        &field.surface(),
        reference.grid(),
        InterpolationMethod::Bilinear,
    );
    let b = reference.surface();

    let result = correlate_named(field.name(), a.data(), reference.name(), b.data())?;
    match &result {
        Some(r) => debug!(
            a = field.name(),
            b = reference.name(),
            r = r.r,
            samples = r.n_samples,
            "Correlated fields"
        ),
        None => warn!(
            a = field.name(),
            b = reference.name(),
            "Insufficient overlapping data for correlation"
        ),
    }
    Ok(result)
}
