//! Test data generators for synthetic climate-like data.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite. All values are `f64` in row-major
//! `[time][lat][lon]` order.

use chrono::{DateTime, Duration, TimeZone, Utc};
use grid_common::{CoordinateGrid, LonConvention};

/// Evenly spaced axis `start, start + step, ...` with `n` values.
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// A regular grid with `n_lat` x `n_lon` cells starting at
/// `(lat0, lon0)` with spacing `step` on both axes.
///
/// # Panics
///
/// If the axes are invalid for `convention`; callers pass fixed test values.
pub fn create_test_grid(
    lat0: f64,
    lon0: f64,
    step: f64,
    n_lat: usize,
    n_lon: usize,
    convention: LonConvention,
) -> CoordinateGrid {
    CoordinateGrid::new(
        regular_axis(lat0, step, n_lat),
        regular_axis(lon0, step, n_lon),
        convention,
    )
    .expect("test grid axes must be valid")
}

/// Cell values `lat_idx * 1000 + lon_idx`, easy to trace back to a cell.
///
/// # Example
///
/// ```
/// use test_utils::create_index_values;
///
/// let values = create_index_values(3, 4);
/// assert_eq!(values.len(), 12);
/// assert_eq!(values[1], 1.0);    // lat 0, lon 1
/// assert_eq!(values[4], 1000.0); // lat 1, lon 0
/// ```
pub fn create_index_values(n_lat: usize, n_lon: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(n_lat * n_lon);
    for lat in 0..n_lat {
        for lon in 0..n_lon {
            data.push((lat * 1000 + lon) as f64);
        }
    }
    data
}

/// Temperature-like values in Kelvin for one lat x lon slice.
///
/// Cools by 0.6 K per degree of latitude away from the equator and warms
/// by 0.05 K per degree eastward, starting from 300 K.
pub fn create_temperature_slice(grid: &CoordinateGrid) -> Vec<f64> {
    let mut data = Vec::with_capacity(grid.len());
    for lat in grid.latitudes() {
        for lon in grid.longitudes() {
            data.push(300.0 - 0.6 * lat.abs() + 0.05 * lon);
        }
    }
    data
}

/// `n` hourly timestamps starting at `start`.
pub fn hourly_times(start: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
    (0..n).map(|h| start + Duration::hours(h as i64)).collect()
}

/// Midnight UTC, 1 January 2020.
pub fn reference_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("fixed date is valid")
}

/// Hourly temperatures over a slice with a diurnal cycle.
///
/// Every cell follows the static temperature pattern of
/// [`create_temperature_slice`] plus `amplitude * cos(2π (hour - 15) / 24)`,
/// so the warmest hour is 15:00 UTC and the coldest 03:00 UTC.
pub fn create_diurnal_temperature(
    grid: &CoordinateGrid,
    times: &[DateTime<Utc>],
    amplitude: f64,
) -> Vec<f64> {
    use chrono::Timelike;

    let base = create_temperature_slice(grid);
    let mut data = Vec::with_capacity(times.len() * base.len());
    for time in times {
        let phase = 2.0 * std::f64::consts::PI * (time.hour() as f64 - 15.0) / 24.0;
        let offset = amplitude * phase.cos();
        data.extend(base.iter().map(|v| v + offset));
    }
    data
}

/// Two series with an exact linear relation `b = slope * a + intercept`.
pub fn create_linear_pair(n: usize, slope: f64, intercept: f64) -> (Vec<f64>, Vec<f64>) {
    let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let b = a.iter().map(|x| slope * x + intercept).collect();
    (a, b)
}

/// Deterministic pseudo-random values in `[0, 1)`.
pub fn create_noise(n: usize, seed: u32) -> Vec<f64> {
    (0..n)
        .map(|i| simple_hash(i as u32, 0, seed) as f64 / (u32::MAX as f64 + 1.0))
        .collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Copy of `values` with NaN at each listed flat index.
pub fn with_nans(values: &[f64], nan_positions: &[usize]) -> Vec<f64> {
    let mut data = values.to_vec();
    for &i in nan_positions {
        if i < data.len() {
            data[i] = f64::NAN;
        }
    }
    data
}
