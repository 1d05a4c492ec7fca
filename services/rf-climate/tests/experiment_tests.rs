//! Experiment pipeline tests over fixture inputs.

use grid_analysis::{
    AnalysisConfig, AnalysisError, BoundingBox, ExtremeKind, Field, GeoPoint, LonConvention, PointSource,
    Significance,
};
use ingestion::{parse_point_records, LabeledDataset, PointSchema};
use rf_climate::{run_experiment, ExperimentOptions};
use test_utils::places::{MADRID, SIERRA_NORTE};
use test_utils::{create_temperature_slice, create_test_grid, era5_temperature_dataset, transmitter_records};

fn madrid_options() -> ExperimentOptions {
    ExperimentOptions {
        region: Some(BoundingBox::from_region(38.0, 42.0, -6.0, -1.0)),
        coarsen_factor: 1,
    }
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        raster_resolution_deg: 0.5,
        ..Default::default()
    }
}

fn madrid_inventory() -> Vec<PointSource> {
    vec![
        PointSource::new(GeoPoint::signed(MADRID.1, MADRID.2), 200.0),
        PointSource::new(GeoPoint::signed(SIERRA_NORTE.1, SIERRA_NORTE.2), 50.0),
    ]
}

/// Temperature slice on a 0..360 grid covering the raster region.
fn unsigned_climate() -> Field {
    let grid = create_test_grid(38.0, 354.0, 0.5, 9, 11, LonConvention::Unsigned360);
    let data = create_temperature_slice(&grid);
    Field::new("t2m", "K", grid, data).unwrap()
}

#[test]
fn test_experiment_report() {
    let report = run_experiment(
        &madrid_inventory(),
        &unsigned_climate(),
        &config(),
        &madrid_options(),
    )
    .unwrap();

    assert_eq!(report.transmitters, 2);
    assert!((report.total_power_w - 250.0).abs() < 1e-9);
    assert_eq!(report.power_density.shape, vec![9, 11]);
    assert_eq!(report.climate.convention, LonConvention::Unsigned360);

    let correlation = report.correlation.as_ref().unwrap();
    assert_eq!(correlation.n_samples, 99);
    assert!(correlation.r.abs() <= 1.0);

    assert_eq!(report.extremes.len(), 10);
    assert_eq!(report.extremes[0].kind, ExtremeKind::Max);
    assert!((report.extremes[0].value - 200.0e-6).abs() < 1e-15);
    assert_eq!(report.forcing.significance, Significance::VeryLow);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["extremes"][0]["type"], "max");
    assert_eq!(json["climate"]["convention"], "unsigned360");
}

#[test]
fn test_coarsened_density_still_correlates() {
    let options = ExperimentOptions {
        coarsen_factor: 2,
        ..madrid_options()
    };
    let report = run_experiment(&madrid_inventory(), &unsigned_climate(), &config(), &options).unwrap();
    assert!(report.correlation.is_some());
    // Forcing is estimated from the full-resolution grid.
    assert_eq!(report.power_density.shape, vec![9, 11]);
}

#[test]
fn test_spatially_uniform_climate_has_no_correlation() {
    let dataset = LabeledDataset::from_value(era5_temperature_dataset()).unwrap();
    let climate = dataset.field("t2m").unwrap();
    let points = parse_point_records(&transmitter_records(50.0), &PointSchema::transmitters()).unwrap();

    let report = run_experiment(&points, &climate, &config(), &madrid_options()).unwrap();
    assert!(report.correlation.is_none());
    assert_eq!(report.climate.dims, vec!["time", "latitude", "longitude"]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let bad = AnalysisConfig {
        absorption_fraction: 2.0,
        ..config()
    };
    let err = run_experiment(&madrid_inventory(), &unsigned_climate(), &bad, &madrid_options())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidConfig(_)));
}
