//! Core types for grid analysis.

use chrono::{DateTime, Utc};
use grid_common::{AnalysisError, AnalysisResult, CoordinateGrid, GeoPoint, LonConvention};
use serde::{Deserialize, Serialize};

/// A named field of values on a latitude/longitude grid, optionally with a
/// leading time axis.
///
/// Values are stored row-major as `[time][lat][lon]`; a field without a time
/// axis behaves as a single time step. Fields are immutable: every transform
/// returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    name: String,
    units: String,
    grid: CoordinateGrid,
    times: Option<Vec<DateTime<Utc>>>,
    data: Vec<f64>,
}

impl Field {
    /// Create a 2-D field. `data` must hold `n_lat * n_lon` values.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        grid: CoordinateGrid,
        data: Vec<f64>,
    ) -> AnalysisResult<Self> {
        if data.len() != grid.len() {
            return Err(AnalysisError::invalid_grid(format!(
                "data length {} does not match grid shape {:?}",
                data.len(),
                grid.shape()
            )));
        }

        Ok(Self::from_parts(name, units, grid, None, data))
    }

    /// Create a time x lat x lon field. `data` must hold
    /// `times.len() * n_lat * n_lon` values.
    pub fn with_times(
        name: impl Into<String>,
        units: impl Into<String>,
        grid: CoordinateGrid,
        times: Vec<DateTime<Utc>>,
        data: Vec<f64>,
    ) -> AnalysisResult<Self> {
        if times.is_empty() {
            return Err(AnalysisError::invalid_grid("time axis is empty"));
        }

        let expected = times.len() * grid.len();
        if data.len() != expected {
            return Err(AnalysisError::invalid_grid(format!(
                "data length {} does not match shape ({}, {}, {})",
                data.len(),
                times.len(),
                grid.n_lat(),
                grid.n_lon()
            )));
        }

        Ok(Self::from_parts(name, units, grid, Some(times), data))
    }

    /// Assemble a field whose shape the caller has already guaranteed.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        units: impl Into<String>,
        grid: CoordinateGrid,
        times: Option<Vec<DateTime<Utc>>>,
        data: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            times.as_ref().map_or(1, |t| t.len()) * grid.len()
        );
        Self {
            name: name.into(),
            units: units.into(),
            grid,
            times,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn times(&self) -> Option<&[DateTime<Utc>]> {
        self.times.as_deref()
    }

    /// All values, `[time][lat][lon]` row-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn is_temporal(&self) -> bool {
        self.times.is_some()
    }

    /// Number of time steps (1 for a 2-D field).
    pub fn n_times(&self) -> usize {
        self.times.as_ref().map_or(1, |t| t.len())
    }

    /// The lat x lon slice at time step `t`.
    pub fn slice(&self, t: usize) -> Option<&[f64]> {
        if t >= self.n_times() {
            return None;
        }
        let size = self.grid.len();
        Some(&self.data[t * size..(t + 1) * size])
    }

    /// Iterate over the lat x lon slices in time order.
    pub fn slices(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.grid.len())
    }

    /// Value at one time step and cell.
    pub fn value(&self, t: usize, lat_idx: usize, lon_idx: usize) -> Option<f64> {
        if lat_idx >= self.grid.n_lat() || lon_idx >= self.grid.n_lon() {
            return None;
        }
        self.slice(t)
            .map(|slice| slice[self.grid.flat_index(lat_idx, lon_idx)])
    }

    /// Every time step at one cell.
    pub fn series_at(&self, lat_idx: usize, lon_idx: usize) -> Vec<f64> {
        let flat = self.grid.flat_index(lat_idx, lon_idx);
        self.slices().map(|slice| slice[flat]).collect()
    }

    /// Number of non-NaN values.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// NaN-aware mean over the time axis. A cell whose every time step is
    /// NaN stays NaN. Returns a 2-D field.
    pub fn time_mean(&self) -> Field {
        let size = self.grid.len();
        let mut sums = vec![0.0; size];
        let mut counts = vec![0usize; size];

        for slice in self.slices() {
            for (i, v) in slice.iter().enumerate() {
                if !v.is_nan() {
                    sums[i] += v;
                    counts[i] += 1;
                }
            }
        }

        let data = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| {
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect();

        Field::from_parts(&self.name, &self.units, self.grid.clone(), None, data)
    }

    /// The 2-D surface used for spatial analysis: the time mean of a
    /// temporal field, or the field itself.
    pub fn surface(&self) -> Field {
        if self.is_temporal() {
            self.time_mean()
        } else {
            self.clone()
        }
    }

    /// A copy with `offset` added to every value (e.g. Kelvin to Celsius).
    pub fn with_offset(&self, offset: f64, units: impl Into<String>) -> Field {
        let data = self.data.iter().map(|v| v + offset).collect();
        Field::from_parts(
            &self.name,
            units,
            self.grid.clone(),
            self.times.clone(),
            data,
        )
    }

    /// A copy with a new name and units.
    pub fn renamed(&self, name: impl Into<String>, units: impl Into<String>) -> Field {
        Field::from_parts(
            name,
            units,
            self.grid.clone(),
            self.times.clone(),
            self.data.clone(),
        )
    }

    /// Re-express the field in another longitude convention, reordering
    /// columns so longitudes stay monotonic.
    pub fn to_convention(&self, target: LonConvention) -> AnalysisResult<Field> {
        let (grid, perm) = self.grid.to_convention(target)?;
        let n_lon = grid.n_lon();

        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks(n_lon) {
            data.extend(perm.iter().map(|src| row[*src]));
        }

        Ok(Field::from_parts(
            &self.name,
            &self.units,
            grid,
            self.times.clone(),
            data,
        ))
    }

    /// Descriptive metadata (name, units, dims, shape).
    pub fn info(&self) -> FieldInfo {
        let mut dims = Vec::with_capacity(3);
        let mut shape = Vec::with_capacity(3);
        if let Some(times) = &self.times {
            dims.push("time".to_string());
            shape.push(times.len());
        }
        dims.push("latitude".to_string());
        shape.push(self.grid.n_lat());
        dims.push("longitude".to_string());
        shape.push(self.grid.n_lon());

        FieldInfo {
            name: self.name.clone(),
            units: self.units.clone(),
            dims,
            shape,
            convention: self.grid.convention(),
            valid_count: self.valid_count(),
        }
    }
}

#[derive(Deserialize)]
struct FieldRepr {
    name: String,
    units: String,
    grid: CoordinateGrid,
    times: Option<Vec<DateTime<Utc>>>,
    data: Vec<f64>,
}

impl TryFrom<FieldRepr> for Field {
    type Error = AnalysisError;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        match repr.times {
            Some(times) => Field::with_times(repr.name, repr.units, repr.grid, times, repr.data),
            None => Field::new(repr.name, repr.units, repr.grid, repr.data),
        }
    }
}

/// Summary of a field's layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub units: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub convention: LonConvention,
    pub valid_count: usize,
}

/// Optional descriptive attributes of a point source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointAttributes {
    pub frequency_hz: Option<f64>,
    pub height_m: Option<f64>,
    pub category: Option<String>,
}

/// An irregular point measurement or emitter, e.g. one RF transmitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub location: GeoPoint,
    /// The quantity being rasterized (transmit power in W for inventories).
    pub value: f64,
    #[serde(default)]
    pub attributes: PointAttributes,
}

impl PointSource {
    pub fn new(location: GeoPoint, value: f64) -> Self {
        Self {
            location,
            value,
            attributes: PointAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: PointAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Whether the coordinates and value are all finite.
    pub fn is_finite(&self) -> bool {
        self.location.lat.is_finite() && self.location.lon.is_finite() && self.value.is_finite()
    }
}

/// Result of a nearest-cell lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCell {
    pub lat_idx: usize,
    pub lon_idx: usize,
    /// Latitude of the resolved cell.
    pub lat: f64,
    /// Longitude of the resolved cell, in the grid's convention.
    pub lon: f64,
    /// Euclidean distance in degrees between the query and the cell.
    pub snap_distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn grid() -> CoordinateGrid {
        CoordinateGrid::new(
            vec![10.0, 20.0],
            vec![0.0, 10.0, 20.0],
            LonConvention::Signed180,
        )
        .unwrap()
    }

    fn hours(n: u32) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|h| Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap())
            .collect()
    }

    #[test]
    fn test_field_shape_mismatch() {
        let err = Field::new("t2m", "K", grid(), vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidGrid(_)));

        let err = Field::with_times("t2m", "K", grid(), hours(2), vec![0.0; 6]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidGrid(_)));
    }

    #[test]
    fn test_slices_and_values() {
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let field = Field::with_times("t2m", "K", grid(), hours(2), data).unwrap();

        assert_eq!(field.n_times(), 2);
        assert_eq!(field.slice(1).unwrap()[0], 6.0);
        assert!(field.slice(2).is_none());
        assert_eq!(field.value(1, 1, 2), Some(11.0));
        assert_eq!(field.value(0, 2, 0), None);
        assert_eq!(field.series_at(0, 1), vec![1.0, 7.0]);
    }

    #[test]
    fn test_time_mean_skips_nan() {
        let data = vec![
            1.0, f64::NAN, 3.0, 4.0, 5.0, f64::NAN, //
            3.0, f64::NAN, 5.0, 6.0, 7.0, 8.0,
        ];
        let field = Field::with_times("t2m", "K", grid(), hours(2), data).unwrap();
        let mean = field.time_mean();

        assert!(!mean.is_temporal());
        assert_eq!(mean.data()[0], 2.0);
        assert!(mean.data()[1].is_nan());
        assert_eq!(mean.data()[5], 8.0);
    }

    #[test]
    fn test_with_offset_leaves_source_untouched() {
        let field = Field::new("t2m", "K", grid(), vec![273.15; 6]).unwrap();
        let celsius = field.with_offset(-273.15, "degC");

        assert_eq!(field.data()[0], 273.15);
        assert!(celsius.data()[0].abs() < 1e-9);
        assert_eq!(celsius.units(), "degC");
    }

    #[test]
    fn test_to_convention_reorders_columns() {
        let grid = CoordinateGrid::new(
            vec![0.0, 1.0],
            vec![0.0, 90.0, 180.0, 270.0],
            LonConvention::Unsigned360,
        )
        .unwrap();
        let data = vec![0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0];
        let field = Field::new("v", "", grid, data).unwrap();

        let signed = field.to_convention(LonConvention::Signed180).unwrap();
        assert_eq!(signed.grid().longitudes(), &[-180.0, -90.0, 0.0, 90.0]);
        assert_eq!(signed.data(), &[2.0, 3.0, 0.0, 1.0, 12.0, 13.0, 10.0, 11.0]);
    }

    #[test]
    fn test_info() {
        let field = Field::with_times("t2m", "K", grid(), hours(3), vec![1.0; 18]).unwrap();
        let info = field.info();
        assert_eq!(info.dims, vec!["time", "latitude", "longitude"]);
        assert_eq!(info.shape, vec![3, 2, 3]);
        assert_eq!(info.valid_count, 18);
    }

    #[test]
    fn test_field_deserialize_validates_shape() {
        let field = Field::new("t2m", "K", grid(), vec![1.0; 6]).unwrap();
        let json = serde_json::to_string(&field).unwrap();
        let back: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);

        let bad = json.replace("[1.0,1.0,1.0,1.0,1.0,1.0]", "[1.0]");
        assert!(serde_json::from_str::<Field>(&bad).is_err());
    }
}
