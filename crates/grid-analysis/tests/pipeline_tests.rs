//! End-to-end analysis over an Iberian transmitter inventory and a
//! reanalysis-style temperature grid stored on 0..360 longitudes.

use grid_analysis::{
    correlate_fields, difference, estimate_radiative_forcing, extract_point_series, extremes,
    field_summary, impact_summary, power_density, regional_summary, resolve, BoundingBox,
    ExtremeKind, Field, GeoPoint, HourWindow, ImpactLevel, LonConvention, PointSource, RasterSpec,
    Significance, DEFAULT_FOOTPRINT_AREA_KM2, KELVIN_TO_CELSIUS,
};
use test_utils::places::{MADRID, MADRID_LON_UNSIGNED, SPANISH_CITIES};
use test_utils::region::{IBERIA, MADRID_AREA};
use test_utils::{
    create_diurnal_temperature, create_test_grid, hourly_times, reference_start, regular_axis,
};

fn iberia_spec() -> RasterSpec {
    let (lat_min, lat_max, lon_min, lon_max) = IBERIA;
    RasterSpec {
        resolution_deg: 0.5,
        lat_min,
        lat_max,
        lon_min,
        lon_max,
        convention: LonConvention::Signed180,
    }
}

/// One transmitter per city, 10 W for Madrid up to 50 W for Bilbao.
fn inventory() -> Vec<PointSource> {
    SPANISH_CITIES
        .iter()
        .enumerate()
        .map(|(i, (_, lat, lon))| PointSource::new(GeoPoint::signed(*lat, *lon), 10.0 * (i + 1) as f64))
        .collect()
}

fn iberia_power_density() -> Field {
    let grid = iberia_spec().build().unwrap();
    power_density(&grid, &inventory(), DEFAULT_FOOTPRINT_AREA_KM2).unwrap()
}

#[test]
fn test_power_density_over_iberia() {
    let density = iberia_power_density();
    assert_eq!(density.grid().shape(), (19, 31));
    assert_eq!(density.units(), "W/m²");

    let total: f64 = density.data().iter().sum();
    assert!((total - 150.0e-6).abs() < 1e-15);

    let stats = field_summary(&density).unwrap();
    assert!((stats.max - 50.0e-6).abs() < 1e-15);
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.count, 19 * 31);
}

#[test]
fn test_regional_summary_around_madrid() {
    let density = iberia_power_density();
    let (lat_min, lat_max, lon_min, lon_max) = MADRID_AREA;
    let bbox = BoundingBox::from_region(lat_min, lat_max, lon_min, lon_max);

    let stats = regional_summary(&density, &bbox).unwrap();
    assert_eq!(stats.count, 6);
    assert!((stats.max - 10.0e-6).abs() < 1e-15);
}

#[test]
fn test_extremes_rank_transmitters() {
    let density = iberia_power_density();
    let points = extremes(&density, 3).unwrap();
    assert_eq!(points.len(), 6);

    let maxima: Vec<f64> = points[..3].iter().map(|p| p.value * 1e6).collect();
    assert!((maxima[0] - 50.0).abs() < 1e-9);
    assert!((maxima[1] - 40.0).abs() < 1e-9);
    assert!((maxima[2] - 30.0).abs() < 1e-9);
    assert!(points[..3].iter().all(|p| p.kind == ExtremeKind::Max));

    // Ties among the empty cells keep row-major order.
    let minima = &points[3..];
    assert!(minima.iter().all(|p| p.kind == ExtremeKind::Min && p.value == 0.0));
    assert_eq!(
        minima.iter().map(|p| (p.lat_idx, p.lon_idx)).collect::<Vec<_>>(),
        vec![(0, 0), (0, 1), (0, 2)]
    );
}

#[test]
fn test_forcing_of_inventory_is_negligible() {
    let density = iberia_power_density();
    let estimate = estimate_radiative_forcing(&density, 0.01, 2.7).unwrap();

    let mean = 150.0e-6 / (19.0 * 31.0);
    assert!((estimate.mean_power_density_w_m2 - mean).abs() < 1e-15);
    assert!((estimate.radiative_forcing_w_m2 - mean * 0.01).abs() < 1e-15);
    assert_eq!(estimate.significance, Significance::VeryLow);
}

#[test]
fn test_correlation_across_conventions() {
    // Signed field whose value is its own longitude, correlated against an
    // unsigned reference holding its own (0..360) longitude.
    let signed_grid = iberia_spec().build().unwrap();
    let signed_values: Vec<f64> = signed_grid
        .latitudes()
        .iter()
        .flat_map(|_| signed_grid.longitudes().to_vec())
        .collect();
    let signed = Field::new("lon_signed", "deg", signed_grid, signed_values).unwrap();

    let reference_grid = grid_analysis::CoordinateGrid::new(
        regular_axis(35.0, 0.5, 19),
        regular_axis(350.0, 0.5, 20),
        LonConvention::Unsigned360,
    )
    .unwrap();
    let reference_values: Vec<f64> = reference_grid
        .latitudes()
        .iter()
        .flat_map(|_| reference_grid.longitudes().to_vec())
        .collect();
    let reference = Field::new("lon_unsigned", "deg", reference_grid, reference_values).unwrap();

    let result = correlate_fields(&signed, &reference).unwrap().unwrap();
    assert_eq!(result.n_samples, 19 * 20);
    assert!((result.r - 1.0).abs() < 1e-9);
    assert!((result.mean_b - result.mean_a - 360.0).abs() < 1e-9);
}

#[test]
fn test_madrid_series_on_unsigned_grid() {
    let grid = create_test_grid(38.0, 350.0, 0.5, 9, 20, LonConvention::Unsigned360);
    let times = hourly_times(reference_start(), 48);
    let data = create_diurnal_temperature(&grid, &times, 5.0);
    let field = Field::with_times("t2m", "K", grid, times, data).unwrap();

    let (_, lat, lon) = MADRID;
    let series = extract_point_series(&field, lat, lon, KELVIN_TO_CELSIUS).unwrap();
    assert_eq!(series.len(), 48);
    assert_eq!(series.units, "degC");
    assert!((series.cell.lon - 356.5).abs() < 1e-9);
    assert!((series.cell.lon - MADRID_LON_UNSIGNED).abs() <= 0.25);
    assert!((series.cell.lat - 40.5).abs() < 1e-9);

    // Looking up the raw signed longitude snaps to the western edge instead.
    let naive = resolve(field.grid(), lat, lon).unwrap();
    assert_eq!(naive.lon_idx, 0);
    assert_ne!(naive.lon_idx, series.cell.lon_idx);

    let partition = series.partition(HourWindow::DAY, HourWindow::NIGHT);
    assert!(partition.asymmetry().unwrap() > 5.0);
    assert!(series.mean().unwrap() < 30.0);
}

#[test]
fn test_warming_experiment_is_significant() {
    let grid = create_test_grid(38.0, -5.0, 0.5, 5, 5, LonConvention::Signed180);
    let times = hourly_times(reference_start(), 24);
    let data = create_diurnal_temperature(&grid, &times, 3.0);
    let control = Field::with_times("t2m", "K", grid, times, data).unwrap();
    let experiment = control.with_offset(0.25, "K");

    let diff = difference(&experiment, &control).unwrap();
    let impact = impact_summary(&diff).unwrap();
    assert!((impact.mean - 0.25).abs() < 1e-9);
    assert_eq!(impact.level, ImpactLevel::Significant);
}
