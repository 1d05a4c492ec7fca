//! Coordinate grids and longitude conventions.
//!
//! A [`CoordinateGrid`] is the immutable `(latitudes, longitudes)` axis pair
//! every field is defined on. Its longitude convention is part of its
//! identity: converting between conventions is an explicit operation and is
//! never done behind a lookup.

use crate::error::{AnalysisError, AnalysisResult};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// How longitudes are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LonConvention {
    /// Signed longitudes, `-180..180` (ERA5 regridded products, station tables).
    #[default]
    Signed180,
    /// Unsigned longitudes, `0..360` (native ERA5/GFS grids).
    Unsigned360,
}

impl LonConvention {
    /// Map any longitude into this convention's canonical range.
    ///
    /// Signed180 yields `[-180, 180)`, Unsigned360 yields `[0, 360)`.
    pub fn normalize(&self, lon: f64) -> f64 {
        match self {
            LonConvention::Signed180 => to_signed(lon),
            LonConvention::Unsigned360 => to_unsigned(lon),
        }
    }

    /// Whether an axis value is admissible for a grid in this convention.
    ///
    /// Axis endpoints are inclusive so that grids built with an inclusive
    /// upper bound (`-180..=180`, `0..=360`) validate.
    pub fn admits(&self, lon: f64) -> bool {
        match self {
            LonConvention::Signed180 => (-180.0..=180.0).contains(&lon),
            LonConvention::Unsigned360 => (0.0..=360.0).contains(&lon),
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "signed180" | "signed_180" | "signed" | "-180..180" => Some(Self::Signed180),
            "unsigned360" | "unsigned_360" | "unsigned" | "0..360" => Some(Self::Unsigned360),
            _ => None,
        }
    }
}

impl std::fmt::Display for LonConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signed180 => write!(f, "signed180"),
            Self::Unsigned360 => write!(f, "unsigned360"),
        }
    }
}

/// Convert a longitude to the unsigned `[0, 360)` convention.
pub fn to_unsigned(lon: f64) -> f64 {
    lon.rem_euclid(360.0)
}

/// Convert a longitude to the signed `[-180, 180)` convention.
pub fn to_signed(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Convert a longitude between conventions. Identity when they match.
pub fn convert_lon(lon: f64, from: LonConvention, to: LonConvention) -> f64 {
    if from == to {
        lon
    } else {
        to.normalize(lon)
    }
}

/// One of the two horizontal axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAxis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for GridAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

/// A coordinate tagged with the convention its longitude is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub convention: LonConvention,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, convention: LonConvention) -> Self {
        Self {
            lat,
            lon,
            convention,
        }
    }

    /// A point with a signed (-180..180) longitude.
    pub fn signed(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, LonConvention::Signed180)
    }

    /// This point's longitude expressed in `target`.
    pub fn lon_in(&self, target: LonConvention) -> f64 {
        convert_lon(self.lon, self.convention, target)
    }
}

/// Immutable latitude/longitude axis pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct CoordinateGrid {
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    convention: LonConvention,
}

impl CoordinateGrid {
    /// Create a grid from two ordered axes.
    ///
    /// Each axis needs at least 2 finite, strictly monotonic values
    /// (ascending or descending). Longitudes must lie inside the declared
    /// convention's range.
    pub fn new(
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        convention: LonConvention,
    ) -> AnalysisResult<Self> {
        validate_axis(&latitudes, GridAxis::Latitude)?;
        validate_axis(&longitudes, GridAxis::Longitude)?;

        if let Some(bad) = longitudes.iter().find(|lon| !convention.admits(**lon)) {
            return Err(AnalysisError::invalid_grid(format!(
                "longitude {} is outside the {} convention",
                bad, convention
            )));
        }

        Ok(Self {
            latitudes,
            longitudes,
            convention,
        })
    }

    /// Create a grid, inferring the longitude convention from the values:
    /// any longitude above 180 means unsigned-360, otherwise signed-180.
    ///
    /// Meant for ingestion boundaries where a dataset carries no explicit tag.
    pub fn with_inferred_convention(
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
    ) -> AnalysisResult<Self> {
        let convention = if longitudes.iter().any(|lon| *lon > 180.0) {
            LonConvention::Unsigned360
        } else {
            LonConvention::Signed180
        };
        Self::new(latitudes, longitudes, convention)
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Values of one axis.
    pub fn axis(&self, axis: GridAxis) -> &[f64] {
        match axis {
            GridAxis::Latitude => &self.latitudes,
            GridAxis::Longitude => &self.longitudes,
        }
    }

    pub fn n_lat(&self) -> usize {
        self.latitudes.len()
    }

    pub fn n_lon(&self) -> usize {
        self.longitudes.len()
    }

    /// `(n_lat, n_lon)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_lat(), self.n_lon())
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.n_lat() * self.n_lon()
    }

    /// Always false: a valid grid has at least 2x2 cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn convention(&self) -> LonConvention {
        self.convention
    }

    /// Row-major flat index of a `(lat_idx, lon_idx)` cell.
    pub fn flat_index(&self, lat_idx: usize, lon_idx: usize) -> usize {
        lat_idx * self.n_lon() + lon_idx
    }

    /// Inverse of [`flat_index`](Self::flat_index).
    pub fn unflatten(&self, flat: usize) -> (usize, usize) {
        (flat / self.n_lon(), flat % self.n_lon())
    }

    /// Extent of the axes, in this grid's longitude convention.
    pub fn bounds(&self) -> BoundingBox {
        let (min_lat, max_lat) = min_max(&self.latitudes);
        let (min_lon, max_lon) = min_max(&self.longitudes);
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }

    /// Check whether a coordinate (in this grid's convention) is inside the
    /// axis extent.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bounds().contains(lon, lat)
    }

    /// Re-express the grid in another longitude convention.
    ///
    /// Returns the new grid together with the column permutation applied:
    /// column `j` of the new grid is column `perm[j]` of this one. The
    /// permutation restores monotonic ascending longitudes when the
    /// conversion wraps the axis. Fails if two longitudes collapse onto the
    /// same value (e.g. an axis holding both 0 and 360).
    pub fn to_convention(&self, target: LonConvention) -> AnalysisResult<(Self, Vec<usize>)> {
        if target == self.convention {
            return Ok((self.clone(), (0..self.n_lon()).collect()));
        }

        let converted: Vec<f64> = self
            .longitudes
            .iter()
            .map(|lon| target.normalize(*lon))
            .collect();

        let mut perm: Vec<usize> = (0..converted.len()).collect();
        perm.sort_by(|a, b| converted[*a].total_cmp(&converted[*b]));
        let longitudes: Vec<f64> = perm.iter().map(|i| converted[*i]).collect();

        let grid = Self::new(self.latitudes.clone(), longitudes, target)?;
        Ok((grid, perm))
    }
}

/// Unvalidated wire form; deserialization goes through [`CoordinateGrid::new`].
#[derive(Deserialize)]
struct GridRepr {
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    convention: LonConvention,
}

impl TryFrom<GridRepr> for CoordinateGrid {
    type Error = AnalysisError;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        CoordinateGrid::new(repr.latitudes, repr.longitudes, repr.convention)
    }
}

fn validate_axis(values: &[f64], axis: GridAxis) -> AnalysisResult<()> {
    if values.len() < 2 {
        return Err(AnalysisError::invalid_grid(format!(
            "{} axis needs at least 2 points, got {}",
            axis,
            values.len()
        )));
    }

    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_grid(format!(
            "{} axis contains non-finite value {}",
            axis, bad
        )));
    }

    let ascending = values.windows(2).all(|w| w[1] > w[0]);
    let descending = values.windows(2).all(|w| w[1] < w[0]);
    if !ascending && !descending {
        return Err(AnalysisError::invalid_grid(format!(
            "{} axis is not strictly monotonic",
            axis
        )));
    }

    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let first = values[0];
    let last = values[values.len() - 1];
    (first.min(last), first.max(last))
}
