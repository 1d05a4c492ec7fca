//! The experiment pipeline: inventory and climate field in, report out.

use chrono::{DateTime, Utc};
use grid_analysis::{
    coarsen, correlate_named, estimate_radiative_forcing, extremes, field_summary,
    interpolate_converted, power_density, AnalysisConfig, CorrelationResult, ExtremePoint, Field,
    BoundingBox, FieldInfo, ForcingEstimate, PointSource, RasterSpec, StatisticsRecord,
};
use grid_common::{AnalysisError, AnalysisResult};
use serde::Serialize;
use tracing::{info, warn};

/// Per-run choices that are not part of [`AnalysisConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentOptions {
    /// Raster extent in signed degrees, clipped to the globe. Defaults to
    /// the whole globe.
    pub region: Option<BoundingBox>,
    /// Block size used to coarsen the power-density grid before it is
    /// resampled onto the climate grid. 1 leaves it untouched.
    pub coarsen_factor: usize,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            region: None,
            coarsen_factor: 1,
        }
    }
}

/// Results document written by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub generated_at: DateTime<Utc>,
    pub config: AnalysisConfig,
    pub transmitters: usize,
    pub total_power_w: f64,
    pub power_density: FieldInfo,
    pub power_density_stats: StatisticsRecord,
    pub climate: FieldInfo,
    pub climate_stats: StatisticsRecord,
    /// `None` when too few cells overlap or either side is constant.
    pub correlation: Option<CorrelationResult>,
    pub forcing: ForcingEstimate,
    pub extremes: Vec<ExtremePoint>,
}

/// Parse `lat_min,lat_max,lon_min,lon_max`.
pub fn parse_region(s: &str) -> AnalysisResult<BoundingBox> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| AnalysisError::invalid_config(format!("invalid region '{}': {}", s, e)))?;

    match values.as_slice() {
        [lat_min, lat_max, lon_min, lon_max] => Ok(BoundingBox::from_region(
            *lat_min, *lat_max, *lon_min, *lon_max,
        )),
        _ => Err(AnalysisError::invalid_config(format!(
            "region '{}' needs four values: lat_min,lat_max,lon_min,lon_max",
            s
        ))),
    }
}

fn raster_spec(config: &AnalysisConfig, options: &ExperimentOptions) -> AnalysisResult<RasterSpec> {
    let mut spec = config.raster_spec();
    let Some(region) = options.region else {
        return Ok(spec);
    };

    let clipped = region
        .intersection(&BoundingBox::default())
        .filter(|bbox| bbox.width() > 0.0 && bbox.height() > 0.0)
        .ok_or_else(|| {
            AnalysisError::invalid_config(format!(
                "region {:?} does not cover any part of the globe",
                region
            ))
        })?;

    if clipped != region {
        warn!(region = ?region, clipped = ?clipped, "Region clipped to the globe");
    }

    spec.lat_min = clipped.min_lat;
    spec.lat_max = clipped.max_lat;
    spec.lon_min = clipped.min_lon;
    spec.lon_max = clipped.max_lon;
    Ok(spec)
}

/// Rasterize the inventory, correlate it with the time-mean climate field
/// on the climate grid and estimate the forcing of the power density.
pub fn run_experiment(
    points: &[PointSource],
    climate: &Field,
    config: &AnalysisConfig,
    options: &ExperimentOptions,
) -> AnalysisResult<ExperimentReport> {
    config.validate()?;

    let grid = raster_spec(config, options)?.build()?;
    let density = power_density(&grid, points, config.footprint_area_km2)?;
    let total_power_w: f64 = points.iter().filter(|p| p.is_finite()).map(|p| p.value).sum();

    info!(
        transmitters = points.len(),
        total_power_w = total_power_w,
        shape = ?grid.shape(),
        "Rasterized inventory"
    );

    let resampled_source = if options.coarsen_factor > 1 {
        coarsen(&density, options.coarsen_factor, config.coarsen_method)?
    } else {
        density.clone()
    };

    let surface = climate.surface();
    let resampled = interpolate_converted(&resampled_source, surface.grid(), config.interpolation);
    let correlation = correlate_named(
        density.name(),
        resampled.data(),
        climate.name(),
        surface.data(),
    )?;

    match &correlation {
        Some(c) => info!(
            variable = climate.name(),
            r = c.r,
            samples = c.n_samples,
            "Correlated power density with climate"
        ),
        None => warn!(
            variable = climate.name(),
            "Correlation undefined for this inventory and climate field"
        ),
    }

    let forcing = estimate_radiative_forcing(
        &density,
        config.absorption_fraction,
        config.co2_forcing_w_m2,
    )?;

    Ok(ExperimentReport {
        generated_at: Utc::now(),
        config: config.clone(),
        transmitters: points.len(),
        total_power_w,
        power_density: density.info(),
        power_density_stats: field_summary(&density)?,
        climate: climate.info(),
        climate_stats: field_summary(&surface)?,
        correlation,
        forcing,
        extremes: extremes(&density, config.extremes_count)?,
    })
}
