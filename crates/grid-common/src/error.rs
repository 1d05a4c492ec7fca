//! Error types for grid analysis.

use thiserror::Error;

/// Result type alias using AnalysisError.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised by the analysis engine.
///
/// Degenerate numeric situations (too few correlation samples, empty
/// partitions) are not errors; they surface as `None` from the operations
/// that can produce them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Malformed coordinate axes or a data array that does not match them.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Non-positive resolution, footprint or other bad parameter range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid (non-NaN) values left after filtering.
    #[error("no valid data: {0}")]
    EmptyData(String),

    /// Out-of-range argument or unknown variable name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AnalysisError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an EmptyData error.
    pub fn empty_data(msg: impl Into<String>) -> Self {
        Self::EmptyData(msg.into())
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::invalid_config("resolution must be > 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration: resolution must be > 0"
        );
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }
}
