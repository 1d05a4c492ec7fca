//! RF-vs-climate experiment.
//!
//! Library half of the `rf-climate` binary, kept separate so the pipeline
//! can be exercised without going through the command line.

pub mod experiment;

pub use experiment::{parse_region, run_experiment, ExperimentOptions, ExperimentReport};
