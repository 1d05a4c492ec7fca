//! Labeled multidimensional datasets.
//!
//! A dataset document names its dimensions, lists a coordinate array per
//! dimension and holds one or more variables as flat row-major arrays:
//!
//! ```json
//! {
//!   "dims": ["valid_time", "latitude", "longitude"],
//!   "coords": {
//!     "valid_time": ["2020-01-01T00:00:00Z", "2020-01-01T01:00:00Z"],
//!     "latitude": [41.0, 40.0],
//!     "longitude": [355.0, 356.0]
//!   },
//!   "variables": { "t2m": { "units": "K", "data": [280.1, null, ...] } }
//! }
//! ```
//!
//! `null` values load as NaN. Dimension names are canonicalized on load.

use crate::axis::{canonical_dims, CanonicalAxis};
use crate::error::{IngestionError, Result};
use chrono::{DateTime, Utc};
use grid_analysis::{Field, FieldInfo};
use grid_common::{AnalysisError, CoordinateGrid, LonConvention};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Coordinate values: numbers for spatial axes, timestamps for time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordValues {
    Numbers(Vec<f64>),
    Times(Vec<DateTime<Utc>>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(v) => v.len(),
            Self::Times(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One data variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub long_name: Option<String>,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetDocument {
    dims: Vec<String>,
    coords: BTreeMap<String, CoordValues>,
    variables: BTreeMap<String, Variable>,
    #[serde(default)]
    convention: Option<String>,
}

/// A dataset whose dimensions have been mapped to canonical axes.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    grid: CoordinateGrid,
    times: Option<Vec<DateTime<Utc>>>,
    variables: BTreeMap<String, Variable>,
}

fn numeric_coord<'a>(
    coords: &'a BTreeMap<String, CoordValues>,
    dim: &str,
) -> Result<&'a [f64]> {
    match coords.get(dim) {
        Some(CoordValues::Numbers(values)) => Ok(values),
        Some(CoordValues::Times(_)) => Err(IngestionError::ShapeMismatch(format!(
            "coordinate '{}' must be numeric",
            dim
        ))),
        None => Err(IngestionError::ShapeMismatch(format!(
            "dimension '{}' has no coordinate array",
            dim
        ))),
    }
}

impl LabeledDataset {
    /// Validate a parsed dataset document.
    ///
    /// Dimensions must be `[time, ] latitude, longitude` in that order
    /// (under any accepted alias). The longitude convention comes from the
    /// document's `convention` key, or is inferred from the longitude values.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let doc: DatasetDocument = serde_json::from_value(value)?;
        let axes = canonical_dims(&doc.dims)?;

        let expected: &[CanonicalAxis] = match axes.len() {
            3 => &[
                CanonicalAxis::Time,
                CanonicalAxis::Latitude,
                CanonicalAxis::Longitude,
            ],
            _ => &[CanonicalAxis::Latitude, CanonicalAxis::Longitude],
        };
        if axes != expected {
            return Err(IngestionError::ShapeMismatch(format!(
                "dimensions {:?} must be ordered as [time,] latitude, longitude",
                doc.dims
            )));
        }

        // Order is fixed from here on: time leads, longitude trails.
        let n = doc.dims.len();
        let latitudes = numeric_coord(&doc.coords, &doc.dims[n - 2])?.to_vec();
        let longitudes = numeric_coord(&doc.coords, &doc.dims[n - 1])?.to_vec();

        let grid = match doc.convention.as_deref() {
            Some(name) => {
                let convention = LonConvention::from_str(name).ok_or_else(|| {
                    AnalysisError::invalid_config(format!("unknown longitude convention '{}'", name))
                })?;
                CoordinateGrid::new(latitudes, longitudes, convention)?
            }
            None => CoordinateGrid::with_inferred_convention(latitudes, longitudes)?,
        };

        let times = if axes.len() == 3 {
            let dim = &doc.dims[0];
            match doc.coords.get(dim) {
                Some(CoordValues::Times(times)) => Some(times.clone()),
                _ => {
                    return Err(IngestionError::ShapeMismatch(format!(
                        "time coordinate '{}' must be a list of timestamps",
                        dim
                    )))
                }
            }
        } else {
            None
        };

        let expected_len = times.as_ref().map_or(1, |t| t.len()) * grid.len();
        if let Some((name, var)) = doc
            .variables
            .iter()
            .find(|(_, var)| var.data.len() != expected_len)
        {
            return Err(IngestionError::ShapeMismatch(format!(
                "variable '{}' has {} values, dimensions need {}",
                name,
                var.data.len(),
                expected_len
            )));
        }

        debug!(
            dims = ?axes,
            shape = ?grid.shape(),
            convention = %grid.convention(),
            variables = doc.variables.len(),
            "Parsed labeled dataset"
        );

        Ok(Self {
            grid,
            times,
            variables: doc.variables,
        })
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn times(&self) -> Option<&[DateTime<Utc>]> {
        self.times.as_deref()
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Extract one variable as a field. Unknown names are an
    /// `InvalidArgument` error.
    pub fn field(&self, name: &str) -> Result<Field> {
        let var = self.variables.get(name).ok_or_else(|| {
            AnalysisError::invalid_argument(format!(
                "unknown variable '{}', available: {:?}",
                name,
                self.variable_names()
            ))
        })?;

        let data: Vec<f64> = var.data.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        let field = match &self.times {
            Some(times) => Field::with_times(name, &var.units, self.grid.clone(), times.clone(), data)?,
            None => Field::new(name, &var.units, self.grid.clone(), data)?,
        };
        Ok(field)
    }

    /// Layout summary of every variable.
    pub fn info(&self) -> Result<Vec<FieldInfo>> {
        self.variables
            .keys()
            .map(|name| Ok(self.field(name)?.info()))
            .collect()
    }
}

/// Load a labeled dataset from a JSON file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<LabeledDataset> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let dataset = LabeledDataset::from_value(serde_json::from_str(&text)?)?;

    info!(
        path = %path.display(),
        variables = ?dataset.variable_names(),
        "Loaded dataset"
    );
    Ok(dataset)
}
