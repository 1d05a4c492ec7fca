//! RF-vs-climate experiment runner.
//!
//! Loads a transmitter inventory and a labeled climate dataset, builds the
//! RF power-density grid, correlates it with the chosen climate variable,
//! estimates radiative forcing and writes the results as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use grid_analysis::AnalysisConfig;
use ingestion::{load_dataset, load_point_table, PointSchema};
use rf_climate::{parse_region, run_experiment, ExperimentOptions};

#[derive(Parser, Debug)]
#[command(name = "rf-climate")]
#[command(about = "Correlate an RF transmitter inventory with a climate dataset")]
struct Args {
    /// Transmitter inventory (JSON records with latitude, longitude, power_w)
    #[arg(long, env = "RF_INVENTORY")]
    inventory: PathBuf,

    /// Labeled climate dataset (JSON)
    #[arg(long, env = "CLIMATE_DATASET")]
    climate: PathBuf,

    /// Climate variable to correlate against
    #[arg(long, default_value = "t2m")]
    variable: String,

    /// Raster resolution in degrees (overrides RASTER_RESOLUTION_DEG)
    #[arg(long)]
    resolution: Option<f64>,

    /// Footprint area per transmitter in km² (overrides FOOTPRINT_AREA_KM2)
    #[arg(long)]
    footprint: Option<f64>,

    /// Raster extent: lat_min,lat_max,lon_min,lon_max (signed degrees)
    #[arg(long)]
    region: Option<String>,

    /// Coarsen the power-density grid by this block size before correlating
    #[arg(long, default_value = "1")]
    coarsen: usize,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays a clean JSON document.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting RF-vs-climate experiment");

    let mut config = AnalysisConfig::from_env();
    if let Some(resolution) = args.resolution {
        config.raster_resolution_deg = resolution;
    }
    if let Some(footprint) = args.footprint {
        config.footprint_area_km2 = footprint;
    }
    config.validate()?;
    info!(config = ?config, "Loaded configuration");

    let options = ExperimentOptions {
        region: args.region.as_deref().map(parse_region).transpose()?,
        coarsen_factor: args.coarsen,
    };

    let points = load_point_table(&args.inventory, &PointSchema::transmitters())
        .with_context(|| format!("loading inventory {}", args.inventory.display()))?;
    let dataset = load_dataset(&args.climate)
        .with_context(|| format!("loading climate dataset {}", args.climate.display()))?;
    let climate = dataset.field(&args.variable)?;

    let report = run_experiment(&points, &climate, &config, &options)?;
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "Wrote report");
        }
        None => println!("{}", json),
    }

    info!(
        correlation = ?report.correlation.as_ref().map(|c| c.r),
        significance = ?report.forcing.significance,
        "Experiment complete"
    );
    Ok(())
}
