//! Experiment-versus-control and urban-versus-rural comparisons.

use crate::stats::{percentile, summary};
use crate::timeseries::TimeSeries;
use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cell-by-cell `experiment - control`.
///
/// Both fields must share a grid and a time axis length.
pub fn difference(experiment: &Field, control: &Field) -> AnalysisResult<Field> {
    if experiment.grid() != control.grid() {
        return Err(AnalysisError::invalid_argument(format!(
            "{} and {} are on different grids",
            experiment.name(),
            control.name()
        )));
    }
    if experiment.n_times() != control.n_times() {
        return Err(AnalysisError::invalid_argument(format!(
            "{} has {} time steps, {} has {}",
            experiment.name(),
            experiment.n_times(),
            control.name(),
            control.n_times()
        )));
    }

    let data = experiment
        .data()
        .iter()
        .zip(control.data())
        .map(|(e, c)| e - c)
        .collect();

    Ok(Field::from_parts(
        format!("{}_minus_{}", experiment.name(), control.name()),
        experiment.units(),
        experiment.grid().clone(),
        experiment.times().map(|t| t.to_vec()),
        data,
    ))
}

/// How strongly a mean difference departs from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// Mean above 0.1.
    Significant,
    /// Mean above 0.01.
    Moderate,
    Negligible,
}

impl ImpactLevel {
    pub fn classify(mean_difference: f64) -> Self {
        if mean_difference > 0.1 {
            Self::Significant
        } else if mean_difference > 0.01 {
            Self::Moderate
        } else {
            Self::Negligible
        }
    }
}

/// Summary of a difference field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std: f64,
    pub p95: f64,
    pub level: ImpactLevel,
}

pub fn impact_summary(diff: &Field) -> AnalysisResult<ImpactSummary> {
    let record = summary(diff.data())?;
    let p95 = percentile(diff.data(), 95.0)?;

    Ok(ImpactSummary {
        mean: record.mean,
        max: record.max,
        min: record.min,
        std: record.std,
        p95,
        level: ImpactLevel::classify(record.mean),
    })
}

/// Urban heat island reading of an urban-minus-rural mean difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatIslandSignal {
    /// Difference above 0.5.
    Detected,
    /// Difference in (0, 0.5].
    Weak,
    /// Difference in (-0.5, 0].
    NoSignal,
    /// Rural site warmer by at least 0.5.
    Inverted,
}

impl HeatIslandSignal {
    pub fn classify(difference: f64) -> Self {
        if difference > 0.5 {
            Self::Detected
        } else if difference > 0.0 {
            Self::Weak
        } else if difference > -0.5 {
            Self::NoSignal
        } else {
            Self::Inverted
        }
    }
}

/// Mean contrast between two point series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointContrast {
    pub urban: String,
    pub rural: String,
    pub urban_mean: f64,
    pub rural_mean: f64,
    /// `urban_mean - rural_mean`.
    pub difference: f64,
    pub signal: HeatIslandSignal,
}

/// Compare the mean of an urban series against a rural one.
///
/// Fails with `EmptyData` when either series has no valid sample.
pub fn point_contrast(urban: &TimeSeries, rural: &TimeSeries) -> AnalysisResult<PointContrast> {
    let urban_mean = urban
        .mean()
        .ok_or_else(|| AnalysisError::empty_data("urban series has no valid samples"))?;
    let rural_mean = rural
        .mean()
        .ok_or_else(|| AnalysisError::empty_data("rural series has no valid samples"))?;

    if urban.cell.lat_idx == rural.cell.lat_idx && urban.cell.lon_idx == rural.cell.lon_idx {
        debug!(
            lat = urban.cell.lat,
            lon = urban.cell.lon,
            "Urban and rural points resolve to the same cell"
        );
    }

    let difference = urban_mean - rural_mean;
    Ok(PointContrast {
        urban: urban.name.clone(),
        rural: rural.name.clone(),
        urban_mean,
        rural_mean,
        difference,
        signal: HeatIslandSignal::classify(difference),
    })
}
