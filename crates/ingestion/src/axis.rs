//! Dimension-name aliasing.
//!
//! Datasets name the same axis differently (`latitude` vs `lat`,
//! `valid_time` vs `time`). Names are mapped onto a canonical axis once,
//! here, so the analysis code only sees canonical axes.

use crate::error::{IngestionError, Result};

/// The axes a labeled dataset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalAxis {
    Time,
    Latitude,
    Longitude,
}

impl CanonicalAxis {
    /// Accepted names, in priority order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Time => &["valid_time", "time", "Time"],
            Self::Latitude => &["latitude", "lat"],
            Self::Longitude => &["longitude", "lon"],
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    /// Map a dimension name onto its canonical axis.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Time, Self::Latitude, Self::Longitude]
            .into_iter()
            .find(|axis| axis.aliases().contains(&name))
    }
}

impl std::fmt::Display for CanonicalAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonicalize a list of dimension names.
///
/// Fails on a name no axis accepts or on two names for the same axis.
pub fn canonical_dims(dims: &[String]) -> Result<Vec<CanonicalAxis>> {
    let mut axes = Vec::with_capacity(dims.len());
    for dim in dims {
        let axis = CanonicalAxis::from_name(dim)
            .ok_or_else(|| IngestionError::UnknownAxis(dim.clone()))?;
        if axes.contains(&axis) {
            return Err(IngestionError::ShapeMismatch(format!(
                "dimension '{}' repeats the {} axis",
                dim, axis
            )));
        }
        axes.push(axis);
    }
    Ok(axes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(CanonicalAxis::from_name("lat"), Some(CanonicalAxis::Latitude));
        assert_eq!(
            CanonicalAxis::from_name("valid_time"),
            Some(CanonicalAxis::Time)
        );
        assert_eq!(CanonicalAxis::from_name("Time"), Some(CanonicalAxis::Time));
        assert_eq!(CanonicalAxis::from_name("level"), None);
    }

    #[test]
    fn test_canonical_dims() {
        let dims = vec!["valid_time".to_string(), "lat".to_string(), "lon".to_string()];
        assert_eq!(
            canonical_dims(&dims).unwrap(),
            vec![
                CanonicalAxis::Time,
                CanonicalAxis::Latitude,
                CanonicalAxis::Longitude
            ]
        );

        let dup = vec!["lat".to_string(), "latitude".to_string()];
        assert!(matches!(
            canonical_dims(&dup),
            Err(IngestionError::ShapeMismatch(_))
        ));

        let unknown = vec!["x".to_string()];
        assert!(matches!(
            canonical_dims(&unknown),
            Err(IngestionError::UnknownAxis(_))
        ));
    }
}
