//! File-based loading tests.

use grid_analysis::{rasterize, Accumulation, LonConvention, RasterSpec};
use ingestion::{load_dataset, load_point_table, IngestionError, PointSchema};
use std::io::Write;
use test_utils::{era5_temperature_dataset, transmitter_records, write_json_temp};

#[test]
fn test_load_transmitter_inventory() {
    let file = write_json_temp(&transmitter_records(50.0));
    let points = load_point_table(file.path(), &PointSchema::transmitters()).unwrap();

    assert_eq!(points.len(), 5);
    assert!(points.iter().all(|p| p.value == 50.0));
    assert_eq!(points[0].attributes.category.as_deref(), Some("Cellular"));
}

#[test]
fn test_inventory_rasterizes_onto_iberia() {
    let file = write_json_temp(&transmitter_records(1.0));
    let points = load_point_table(file.path(), &PointSchema::transmitters()).unwrap();

    let spec = RasterSpec {
        resolution_deg: 1.0,
        lat_min: 35.0,
        lat_max: 44.0,
        lon_min: -10.0,
        lon_max: 5.0,
        convention: LonConvention::Signed180,
    };
    let grid = spec.build().unwrap();
    let counts = rasterize(&grid, &points, Accumulation::Count);
    let total: f64 = counts.data().iter().sum();
    assert_eq!(total, 5.0);
}

#[test]
fn test_load_dataset_from_file() {
    let file = write_json_temp(&era5_temperature_dataset());
    let dataset = load_dataset(file.path()).unwrap();

    assert_eq!(dataset.grid().convention(), LonConvention::Unsigned360);
    let field = dataset.field("t2m").unwrap();
    assert_eq!(field.grid().shape(), (3, 4));
    assert_eq!(field.value(1, 2, 3), Some(281.0));

    let info = dataset.info().unwrap();
    assert_eq!(info[0].dims, vec!["time", "latitude", "longitude"]);
}

#[test]
fn test_missing_file_is_file_read_error() {
    let err = load_dataset("/nonexistent/dataset.json").unwrap_err();
    assert!(matches!(err, IngestionError::FileRead(_)));
}

#[test]
fn test_malformed_json_is_json_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[{\"latitude\": 40.0,").unwrap();
    let err = load_point_table(file.path(), &PointSchema::default()).unwrap_err();
    assert!(matches!(err, IngestionError::Json(_)));
}
