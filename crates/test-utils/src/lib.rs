//! Shared test utilities for the climate grid analysis workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic grid and time series generators
//! - Reference locations and input documents
//! - Temporary file helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_test_grid, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::io::Write;
use tempfile::NamedTempFile;

/// Write `value` as JSON to a temporary file that lives as long as the
/// returned handle.
///
/// # Panics
///
/// If the temporary file cannot be created or written.
pub fn write_json_temp(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(value.to_string().as_bytes())
        .expect("write temp file");
    file
}
