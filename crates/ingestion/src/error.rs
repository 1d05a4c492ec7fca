//! Error types for the ingestion crate.

use grid_common::AnalysisError;
use thiserror::Error;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Row {row}: missing required column '{column}'")]
    MissingColumn { column: String, row: usize },

    #[error("Row {row}: column '{column}' is not numeric")]
    NonNumeric { column: String, row: usize },

    #[error("Unknown axis name: {0}")]
    UnknownAxis(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
