//! Point time series extraction and diurnal partitioning.

use crate::nearest::resolve_point;
use crate::stats::{summary, StatisticsRecord};
use crate::types::{Field, ResolvedCell};
use chrono::{DateTime, Timelike, Utc};
use grid_common::{AnalysisError, AnalysisResult, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Additive offset converting Kelvin to degrees Celsius.
pub const KELVIN_TO_CELSIUS: f64 = -273.15;

/// One timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Values of one field over time at a single resolved cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub units: String,
    /// The coordinate that was asked for.
    pub requested: GeoPoint,
    /// The grid cell it snapped to.
    pub cell: ResolvedCell,
    pub points: Vec<SeriesPoint>,
}

/// Extract the series nearest to `(lat, lon)`, with `lon` in signed
/// -180..180 degrees.
pub fn extract_point_series(
    field: &Field,
    lat: f64,
    lon: f64,
    unit_offset: f64,
) -> AnalysisResult<TimeSeries> {
    extract_point_series_at(field, &GeoPoint::signed(lat, lon), unit_offset)
}

/// Extract the series at the cell nearest to `point`.
///
/// The point's longitude is converted to the field's convention before the
/// lookup. `unit_offset` is added to every value of the returned series;
/// the field itself is left untouched.
pub fn extract_point_series_at(
    field: &Field,
    point: &GeoPoint,
    unit_offset: f64,
) -> AnalysisResult<TimeSeries> {
    let times = field.times().ok_or_else(|| {
        AnalysisError::invalid_argument(format!("{} has no time axis", field.name()))
    })?;

    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(AnalysisError::invalid_argument(format!(
            "point ({}, {}) is not a finite coordinate",
            point.lat, point.lon
        )));
    }

    let cell = resolve_point(field.grid(), point)?;
    let points = times
        .iter()
        .zip(field.series_at(cell.lat_idx, cell.lon_idx))
        .map(|(time, value)| SeriesPoint {
            time: *time,
            value: value + unit_offset,
        })
        .collect();

    debug!(
        field = field.name(),
        lat = point.lat,
        lon = point.lon,
        cell_lat = cell.lat,
        cell_lon = cell.lon,
        snap_distance = cell.snap_distance,
        "Extracted point series"
    );

    Ok(TimeSeries {
        name: field.name().to_string(),
        units: offset_units(field.units(), unit_offset),
        requested: *point,
        cell,
        points,
    })
}

fn offset_units(units: &str, offset: f64) -> String {
    if units == "K" && offset == KELVIN_TO_CELSIUS {
        "degC".to_string()
    } else {
        units.to_string()
    }
}

/// Closed range of hours of day, `[start, end]`.
///
/// When `start > end` the window wraps past midnight: `[22, 6]` holds
/// 22, 23, 0, ..., 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HourWindowRepr")]
pub struct HourWindow {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct HourWindowRepr {
    start: u32,
    end: u32,
}

impl TryFrom<HourWindowRepr> for HourWindow {
    type Error = AnalysisError;

    fn try_from(repr: HourWindowRepr) -> Result<Self, Self::Error> {
        HourWindow::new(repr.start, repr.end)
    }
}

impl HourWindow {
    /// Daytime heating window, 10:00 to 18:00.
    pub const DAY: HourWindow = HourWindow { start: 10, end: 18 };
    /// Night window, 22:00 to 06:00.
    pub const NIGHT: HourWindow = HourWindow { start: 22, end: 6 };

    pub fn new(start: u32, end: u32) -> AnalysisResult<Self> {
        if start > 23 || end > 23 {
            return Err(AnalysisError::invalid_argument(format!(
                "hour window [{}, {}] must use hours 0-23",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour <= self.end
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}

/// A series split into two hour-of-day windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiurnalPartition {
    pub day: Vec<SeriesPoint>,
    pub night: Vec<SeriesPoint>,
    /// NaN-aware mean of the day samples, `None` when there are none.
    pub day_mean: Option<f64>,
    pub night_mean: Option<f64>,
}

impl DiurnalPartition {
    /// Day mean minus night mean.
    pub fn asymmetry(&self) -> Option<f64> {
        Some(self.day_mean? - self.night_mean?)
    }
}

fn nan_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// NaN-aware mean, `None` when no valid value exists.
    pub fn mean(&self) -> Option<f64> {
        nan_mean(self.points.iter().map(|p| p.value))
    }

    pub fn summary(&self) -> AnalysisResult<StatisticsRecord> {
        Ok(summary(&self.values())?.with_name(&self.name))
    }

    /// Split samples by the UTC hour of their timestamp. A sample may land
    /// in both windows if they overlap, or in neither.
    pub fn partition(&self, day: HourWindow, night: HourWindow) -> DiurnalPartition {
        let pick = |window: HourWindow| -> Vec<SeriesPoint> {
            self.points
                .iter()
                .filter(|p| window.contains(p.time.hour()))
                .copied()
                .collect()
        };
        let day_points = pick(day);
        let night_points = pick(night);

        DiurnalPartition {
            day_mean: nan_mean(day_points.iter().map(|p| p.value)),
            night_mean: nan_mean(night_points.iter().map(|p| p.value)),
            day: day_points,
            night: night_points,
        }
    }

    /// Centered moving mean over `window` samples.
    ///
    /// Sample `i` averages `[i - window / 2, i - window / 2 + window)`; it is
    /// NaN where that range runs off either end or contains a NaN.
    pub fn rolling_mean(&self, window: usize) -> AnalysisResult<TimeSeries> {
        if window == 0 {
            return Err(AnalysisError::invalid_argument("rolling window must be > 0"));
        }

        let values = self.values();
        let half = window / 2;
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let value = match i.checked_sub(half) {
                    Some(start) if start + window <= values.len() => {
                        let slice = &values[start..start + window];
                        if slice.iter().any(|v| v.is_nan()) {
                            f64::NAN
                        } else {
                            slice.iter().sum::<f64>() / window as f64
                        }
                    }
                    _ => f64::NAN,
                };
                SeriesPoint {
                    time: p.time,
                    value,
                }
            })
            .collect();

        Ok(TimeSeries {
            name: format!("{}_rolling{}", self.name, window),
            points,
            ..self.clone()
        })
    }
}

/// Mean over all cells at each time step, ignoring NaN.
pub fn spatial_mean_series(field: &Field) -> AnalysisResult<Vec<SeriesPoint>> {
    let times = field.times().ok_or_else(|| {
        AnalysisError::invalid_argument(format!("{} has no time axis", field.name()))
    })?;

    Ok(times
        .iter()
        .zip(field.slices())
        .map(|(time, slice)| SeriesPoint {
            time: *time,
            value: nan_mean(slice.iter().copied()).unwrap_or(f64::NAN),
        })
        .collect())
}
