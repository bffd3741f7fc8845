//! Raw per-payload sample files: one integer latency per line.

use crate::error::PipelineError;
use crate::metrics::{self, TrimmedMean};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Trimming parameters for raw sample files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimParams {
    pub sample_count: usize,
    pub low_quantile: f64,
    pub high_quantile: f64,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            sample_count: 20,
            low_quantile: 0.2,
            high_quantile: 0.85,
        }
    }
}

/// File name the harness uses for a payload size.
pub fn sample_file_name(size_bytes: u64) -> String {
    format!("Result-{size_bytes}.csv")
}

pub fn sample_file_path(dir: &Path, size_bytes: u64) -> PathBuf {
    dir.join(sample_file_name(size_bytes))
}

/// Read exactly the first `count` lines as integers.
pub fn read_samples<R: BufRead>(reader: R, count: usize) -> Result<Vec<i64>, PipelineError> {
    let mut samples = Vec::with_capacity(count);
    for (idx, line) in reader.lines().take(count).enumerate() {
        let line = line?;
        let v = line
            .trim()
            .parse::<i64>()
            .map_err(|_| PipelineError::MalformedSample {
                line: idx + 1,
                value: line.clone(),
            })?;
        samples.push(v);
    }
    if samples.len() < count {
        return Err(PipelineError::TooFewSamples {
            expected: count,
            found: samples.len(),
        });
    }
    Ok(samples)
}

pub fn trimmed_mean_from_reader<R: BufRead>(
    reader: R,
    params: &TrimParams,
) -> Result<TrimmedMean, PipelineError> {
    let samples = read_samples(reader, params.sample_count)?;
    metrics::trimmed_mean(&samples, params.low_quantile, params.high_quantile)
}

pub fn trimmed_mean_from_file(path: &Path, params: &TrimParams) -> anyhow::Result<TrimmedMean> {
    use anyhow::Context;
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let trimmed = trimmed_mean_from_reader(std::io::BufReader::new(file), params)
        .with_context(|| format!("trimmed mean of {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        retained = ?trimmed.retained,
        mean = trimmed.mean,
        "trimmed samples"
    );
    Ok(trimmed)
}
