//! Point-source tables.
//!
//! Tables arrive as JSON arrays of records (one object per row). Every row
//! is checked for the required coordinate and value columns before it can
//! become a [`PointSource`]; a bad row fails the whole load.

use crate::error::{IngestionError, Result};
use grid_analysis::{PointAttributes, PointSource};
use grid_common::{GeoPoint, LonConvention};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Column layout of a point table.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSchema {
    /// Accepted names for the latitude column, in priority order.
    pub latitude_columns: Vec<String>,
    pub longitude_columns: Vec<String>,
    /// Column holding the value to rasterize.
    pub value_column: String,
    /// Convention the longitude column is expressed in.
    pub convention: LonConvention,
}

impl Default for PointSchema {
    fn default() -> Self {
        Self {
            latitude_columns: vec!["latitude".to_string(), "lat".to_string()],
            longitude_columns: vec!["longitude".to_string(), "lon".to_string()],
            value_column: "power_w".to_string(),
            convention: LonConvention::Signed180,
        }
    }
}

impl PointSchema {
    /// Transmitter inventories: signed coordinates, power in `power_w`.
    pub fn transmitters() -> Self {
        Self::default()
    }

    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    pub fn with_convention(mut self, convention: LonConvention) -> Self {
        self.convention = convention;
        self
    }
}

fn lookup<'a>(row: &'a Map<String, Value>, names: &'a [String]) -> Option<(&'a str, &'a Value)> {
    names
        .iter()
        .find_map(|name| row.get(name.as_str()).map(|v| (name.as_str(), v)))
}

fn required_number(
    row: &Map<String, Value>,
    names: &[String],
    index: usize,
) -> Result<f64> {
    let (column, value) = lookup(row, names).ok_or_else(|| IngestionError::MissingColumn {
        column: names.first().cloned().unwrap_or_default(),
        row: index,
    })?;

    value.as_f64().ok_or_else(|| IngestionError::NonNumeric {
        column: column.to_string(),
        row: index,
    })
}

fn optional_number(row: &Map<String, Value>, names: &[&str], index: usize) -> Result<Option<f64>> {
    for name in names {
        match row.get(*name) {
            None | Some(Value::Null) => continue,
            Some(value) => {
                return value.as_f64().map(Some).ok_or_else(|| IngestionError::NonNumeric {
                    column: name.to_string(),
                    row: index,
                })
            }
        }
    }
    Ok(None)
}

/// Validate a JSON records array and convert every row to a point source.
pub fn parse_point_records(records: &Value, schema: &PointSchema) -> Result<Vec<PointSource>> {
    let rows = records.as_array().ok_or_else(|| {
        IngestionError::InvalidTable("expected a JSON array of records".to_string())
    })?;

    let value_columns = vec![schema.value_column.clone()];
    let mut points = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let row = row.as_object().ok_or_else(|| {
            IngestionError::InvalidTable(format!("row {} is not an object", index))
        })?;

        let lat = required_number(row, &schema.latitude_columns, index)?;
        let lon = required_number(row, &schema.longitude_columns, index)?;
        let value = required_number(row, &value_columns, index)?;

        let attributes = PointAttributes {
            frequency_hz: optional_number(row, &["frequency_hz", "frequency"], index)?,
            height_m: optional_number(row, &["height_m", "height"], index)?,
            category: ["category", "type"]
                .iter()
                .find_map(|k| row.get(*k).and_then(Value::as_str))
                .map(str::to_string),
        };

        points.push(
            PointSource::new(GeoPoint::new(lat, lon, schema.convention), value)
                .with_attributes(attributes),
        );
    }

    debug!(
        rows = points.len(),
        value_column = %schema.value_column,
        "Validated point table"
    );
    Ok(points)
}

/// Load and validate a point table from a JSON records file.
pub fn load_point_table(path: impl AsRef<Path>, schema: &PointSchema) -> Result<Vec<PointSource>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let records: Value = serde_json::from_str(&text)?;
    let points = parse_point_records(&records, schema)?;

    info!(
        path = %path.display(),
        points = points.len(),
        "Loaded point table"
    );
    Ok(points)
}
