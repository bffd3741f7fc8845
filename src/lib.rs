//! Aggregation and plotting of OpenWhisk load-test results.
//!
//! Raw rows are grouped by the sentinel-delimited fold in [`aggregate`],
//! reduced with [`metrics`] and drawn by [`charts`]. The [`jobs`] module wires
//! these together for each historical figure set.

pub mod aggregate;
pub mod charts;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod model;
pub mod samples;
pub mod storage;
pub mod text_summary;

pub use error::PipelineError;
