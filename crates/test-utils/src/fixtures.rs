//! Common test fixtures for climate grid analysis tests.
//!
//! Pre-defined locations, regions and input documents that represent the
//! scenarios the analysis crates are exercised against.

use serde_json::{json, Value};

/// Reference locations as `(name, lat, signed lon)`.
pub mod places {
    pub const MADRID: (&str, f64, f64) = ("Madrid", 40.4168, -3.7038);
    pub const BARCELONA: (&str, f64, f64) = ("Barcelona", 41.3851, 2.1734);
    pub const VALENCIA: (&str, f64, f64) = ("Valencia", 39.4699, -0.3763);
    pub const SEVILLA: (&str, f64, f64) = ("Sevilla", 37.3891, -5.9845);
    pub const BILBAO: (&str, f64, f64) = ("Bilbao", 43.2630, -2.9350);

    /// Rural reference north of Madrid.
    pub const SIERRA_NORTE: (&str, f64, f64) = ("Sierra Norte", 41.0, -3.7);

    pub const SPANISH_CITIES: [(&str, f64, f64); 5] = [MADRID, BARCELONA, VALENCIA, SEVILLA, BILBAO];

    /// Madrid's longitude as stored on native 0..360 reanalysis grids.
    pub const MADRID_LON_UNSIGNED: f64 = 356.2962;
}

/// Regions as `(lat_min, lat_max, lon_min, lon_max)`, signed longitudes.
pub mod region {
    /// Iberian Peninsula.
    pub const IBERIA: (f64, f64, f64, f64) = (35.0, 44.0, -10.0, 5.0);

    /// Greater Madrid.
    pub const MADRID_AREA: (f64, f64, f64, f64) = (40.0, 41.0, -4.2, -3.2);
}

/// Transmitter inventory as JSON records, one per Spanish city, with the
/// given power in watts for each.
pub fn transmitter_records(power_w: f64) -> Value {
    let records: Vec<Value> = places::SPANISH_CITIES
        .iter()
        .enumerate()
        .map(|(i, (name, lat, lon))| {
            json!({
                "transmitter_id": format!("TX_{:04}", i),
                "city": name,
                "latitude": lat,
                "longitude": lon,
                "frequency_hz": 900.0e6,
                "power_w": power_w,
                "height_m": 30.0,
                "type": "Cellular"
            })
        })
        .collect();
    Value::Array(records)
}

/// Labeled dataset document with a `valid_time x lat x lon` temperature
/// variable on a 0..360 grid around Madrid.
///
/// Every value is `280 + t`, where `t` is the time index.
pub fn era5_temperature_dataset() -> Value {
    let lats = [41.0, 40.5, 40.0];
    let lons = [355.5, 356.0, 356.5, 357.0];
    let times = [
        "2020-01-01T00:00:00Z",
        "2020-01-01T12:00:00Z",
    ];

    let mut data = Vec::new();
    for t in 0..times.len() {
        for _ in 0..lats.len() * lons.len() {
            data.push(280.0 + t as f64);
        }
    }

    json!({
        "dims": ["valid_time", "lat", "lon"],
        "coords": {
            "valid_time": times,
            "lat": lats,
            "lon": lons
        },
        "variables": {
            "t2m": {
                "units": "K",
                "long_name": "2 metre temperature",
                "data": data
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transmitter_records() {
        let records = transmitter_records(50.0);
        let array = records.as_array().unwrap();
        assert_eq!(array.len(), 5);
        assert_eq!(array[0]["city"], "Madrid");
        assert_eq!(array[0]["power_w"], 50.0);
    }

    #[test]
    fn test_era5_dataset_shape() {
        let dataset = era5_temperature_dataset();
        let data = dataset["variables"]["t2m"]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2 * 3 * 4);
    }
}
