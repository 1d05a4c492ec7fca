//! Configuration for grid analysis.

use crate::downsample::DownsampleMethod;
use crate::forcing::{DEFAULT_ABSORPTION_FRACTION, DEFAULT_CO2_FORCING_W_M2};
use crate::interpolation::InterpolationMethod;
use crate::rasterize::{RasterSpec, DEFAULT_FOOTPRINT_AREA_KM2};
use grid_common::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Tunable parameters of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Cell spacing of rasterized point grids, in degrees.
    pub raster_resolution_deg: f64,

    /// Nominal area each point source is spread over, in km².
    pub footprint_area_km2: f64,

    /// Fraction of emitted power assumed absorbed by the atmosphere.
    pub absorption_fraction: f64,

    /// Reference CO₂ forcing in W/m².
    pub co2_forcing_w_m2: f64,

    /// How many maxima and minima to report.
    pub extremes_count: usize,

    /// Aggregation used when coarsening grids.
    pub coarsen_method: DownsampleMethod,

    /// Interpolation method for grid resampling.
    pub interpolation: InterpolationMethod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            raster_resolution_deg: 0.1,
            footprint_area_km2: DEFAULT_FOOTPRINT_AREA_KM2,
            absorption_fraction: DEFAULT_ABSORPTION_FRACTION,
            co2_forcing_w_m2: DEFAULT_CO2_FORCING_W_M2,
            extremes_count: 5,
            coarsen_method: DownsampleMethod::Mean,
            interpolation: InterpolationMethod::Bilinear,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RASTER_RESOLUTION_DEG") {
            if let Ok(res) = val.parse() {
                config.raster_resolution_deg = res;
            }
        }

        if let Ok(val) = std::env::var("FOOTPRINT_AREA_KM2") {
            if let Ok(area) = val.parse() {
                config.footprint_area_km2 = area;
            }
        }

        if let Ok(val) = std::env::var("ABSORPTION_FRACTION") {
            if let Ok(fraction) = val.parse() {
                config.absorption_fraction = fraction;
            }
        }

        if let Ok(val) = std::env::var("CO2_FORCING_W_M2") {
            if let Ok(forcing) = val.parse() {
                config.co2_forcing_w_m2 = forcing;
            }
        }

        if let Ok(val) = std::env::var("EXTREMES_COUNT") {
            if let Ok(count) = val.parse() {
                config.extremes_count = count;
            }
        }

        if let Ok(val) = std::env::var("COARSEN_METHOD") {
            config.coarsen_method = DownsampleMethod::from_str(&val);
        }

        if let Ok(val) = std::env::var("GRID_INTERPOLATION") {
            config.interpolation = InterpolationMethod::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.raster_resolution_deg.is_finite() || self.raster_resolution_deg <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "raster_resolution_deg must be > 0",
            ));
        }

        if !self.footprint_area_km2.is_finite() || self.footprint_area_km2 <= 0.0 {
            return Err(AnalysisError::invalid_config("footprint_area_km2 must be > 0"));
        }

        if !(0.0..=1.0).contains(&self.absorption_fraction) {
            return Err(AnalysisError::invalid_config(
                "absorption_fraction must be within [0, 1]",
            ));
        }

        if !self.co2_forcing_w_m2.is_finite() || self.co2_forcing_w_m2 <= 0.0 {
            return Err(AnalysisError::invalid_config("co2_forcing_w_m2 must be > 0"));
        }

        if self.extremes_count == 0 {
            return Err(AnalysisError::invalid_config("extremes_count must be > 0"));
        }

        Ok(())
    }

    /// Global raster at the configured resolution.
    pub fn raster_spec(&self) -> RasterSpec {
        RasterSpec::global(self.raster_resolution_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.footprint_area_km2, 1.0);
        assert_eq!(config.raster_spec().resolution_deg, 0.1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            AnalysisConfig {
                raster_resolution_deg: 0.0,
                ..Default::default()
            },
            AnalysisConfig {
                footprint_area_km2: -1.0,
                ..Default::default()
            },
            AnalysisConfig {
                absorption_fraction: 1.5,
                ..Default::default()
            },
            AnalysisConfig {
                extremes_count: 0,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(AnalysisError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_config_deserializes_methods() {
        let json = r#"{
            "raster_resolution_deg": 0.25,
            "footprint_area_km2": 2.0,
            "absorption_fraction": 0.02,
            "co2_forcing_w_m2": 2.7,
            "extremes_count": 3,
            "coarsen_method": "max",
            "interpolation": "nearest"
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.coarsen_method, DownsampleMethod::Max);
        assert_eq!(config.interpolation, InterpolationMethod::Nearest);
        assert!(config.validate().is_ok());
    }
}
