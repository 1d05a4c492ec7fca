//! Order-of-magnitude radiative forcing estimate for a power density field.
//!
//! The estimate assumes a fixed fraction of the emitted power is absorbed by
//! the atmosphere. It ignores frequency and humidity dependence and is meant
//! only for comparison against the anthropogenic CO₂ forcing.

use crate::stats::summary;
use crate::types::Field;
use grid_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_ABSORPTION_FRACTION: f64 = 0.01;

/// Present-day anthropogenic CO₂ forcing, W/m².
pub const DEFAULT_CO2_FORCING_W_M2: f64 = 2.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Significance {
    /// Below 0.1% of the CO₂ forcing.
    VeryLow,
    /// Below 1%.
    Low,
    Moderate,
}

impl Significance {
    pub fn classify(co2_ratio: f64) -> Self {
        if co2_ratio < 0.001 {
            Self::VeryLow
        } else if co2_ratio < 0.01 {
            Self::Low
        } else {
            Self::Moderate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcingEstimate {
    pub mean_power_density_w_m2: f64,
    pub absorption_fraction: f64,
    pub radiative_forcing_w_m2: f64,
    pub co2_forcing_ratio: f64,
    pub significance: Significance,
}

/// Estimate the forcing of `power_density` (W/m²) as its NaN-aware mean
/// times `absorption_fraction`, relative to `co2_forcing_w_m2`.
pub fn estimate_radiative_forcing(
    power_density: &Field,
    absorption_fraction: f64,
    co2_forcing_w_m2: f64,
) -> AnalysisResult<ForcingEstimate> {
    if !(0.0..=1.0).contains(&absorption_fraction) {
        return Err(AnalysisError::invalid_config(format!(
            "absorption fraction must be within [0, 1], got {}",
            absorption_fraction
        )));
    }
    if !co2_forcing_w_m2.is_finite() || co2_forcing_w_m2 <= 0.0 {
        return Err(AnalysisError::invalid_config(format!(
            "CO2 forcing must be > 0, got {}",
            co2_forcing_w_m2
        )));
    }

    let mean = summary(power_density.data())?.mean;
    let forcing = mean * absorption_fraction;
    let ratio = forcing / co2_forcing_w_m2;
    let significance = Significance::classify(ratio);

    info!(
        mean_power_density = mean,
        radiative_forcing = forcing,
        co2_ratio = ratio,
        significance = ?significance,
        "Estimated radiative forcing"
    );

    Ok(ForcingEstimate {
        mean_power_density_w_m2: mean,
        absorption_fraction,
        radiative_forcing_w_m2: forcing,
        co2_forcing_ratio: ratio,
        significance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::{CoordinateGrid, LonConvention};

    fn density(values: Vec<f64>) -> Field {
        let grid = CoordinateGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], LonConvention::Signed180)
            .unwrap();
        Field::new("rf_power_density", "W/m²", grid, values).unwrap()
    }

    #[test]
    fn test_estimate() {
        let estimate = estimate_radiative_forcing(
            &density(vec![4.0, 0.0, 0.0, 0.0]),
            DEFAULT_ABSORPTION_FRACTION,
            DEFAULT_CO2_FORCING_W_M2,
        )
        .unwrap();

        assert!((estimate.mean_power_density_w_m2 - 1.0).abs() < 1e-12);
        assert!((estimate.radiative_forcing_w_m2 - 0.01).abs() < 1e-12);
        assert!((estimate.co2_forcing_ratio - 0.01 / 2.7).abs() < 1e-12);
        assert_eq!(estimate.significance, Significance::Low);
    }

    #[test]
    fn test_significance_thresholds() {
        assert_eq!(Significance::classify(0.0005), Significance::VeryLow);
        assert_eq!(Significance::classify(0.001), Significance::Low);
        assert_eq!(Significance::classify(0.01), Significance::Moderate);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let field = density(vec![1.0; 4]);
        assert!(matches!(
            estimate_radiative_forcing(&field, 1.5, 2.7),
            Err(AnalysisError::InvalidConfig(_))
        ));
        assert!(matches!(
            estimate_radiative_forcing(&field, 0.01, 0.0),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serializes_significance() {
        let json = serde_json::to_string(&Significance::VeryLow).unwrap();
        assert_eq!(json, r#""VERY_LOW""#);
    }
}
