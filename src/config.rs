//! Job configuration.
//!
//! Every field defaults to the constants the historical plots were produced
//! with. A JSON file may override any subset of them, and CLI flags override
//! the file.

use crate::samples::TrimParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyJobConfig {
    pub csv: PathBuf,
    /// Load-generator concurrency of the row that closes each group.
    pub sentinel_load: i64,
    /// Rows with more errors than this are left out.
    pub max_errors: i64,
    pub latency_output: PathBuf,
    pub throughput_output: PathBuf,
}

impl Default for ConcurrencyJobConfig {
    fn default() -> Self {
        Self {
            csv: "ConcurrencyLatency.csv".into(),
            sentinel_load: 30,
            max_errors: 10,
            latency_output: "Conc_Latency.png".into(),
            throughput_output: "Conc_Throughput.png".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadJobConfig {
    pub csv: PathBuf,
    /// Load-generator concurrency of the row that closes each averaging window.
    pub boundary_load: i64,
    /// Accepted `payloadfile` values, in legend order.
    pub labels: Vec<String>,
    /// Platform concurrency levels on the x axis.
    pub x_axis: Vec<i64>,
    pub latency_output: PathBuf,
    pub throughput_output: PathBuf,
}

impl Default for PayloadJobConfig {
    fn default() -> Self {
        Self {
            csv: "payload_latency.csv".into(),
            boundary_load: 10,
            labels: vec![
                "timeout30".into(),
                "timeout30payload1K".into(),
                "timeout30payload100K".into(),
                "timeout30payload1M".into(),
            ],
            x_axis: vec![1, 2, 3, 4, 5],
            latency_output: "Payloadplot_Latency.png".into(),
            throughput_output: "Payloadplot_Throughput.png".into(),
        }
    }
}

/// One payload size and its tick label in KB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSize {
    pub bytes: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTransferJobConfig {
    pub sizes: Vec<PayloadSize>,
    /// The partial plot covers the first `partial_len` sizes.
    pub partial_len: usize,
    pub trim: TrimParams,
    pub output: PathBuf,
    pub partial_output: PathBuf,
}

const DATA_TRANSFER_SIZES: [(u64, &str); 20] = [
    (0, "0"),
    (1024, "1"),
    (5120, "5"),
    (10240, "10"),
    (15360, "15"),
    (20480, "20"),
    (25600, "25.6"),
    (30720, "30"),
    (35840, "36"),
    (40960, "41"),
    (46080, "46"),
    (51200, "51"),
    (100000, "100"),
    (128000, "128"),
    (208000, "208"),
    (256000, "256"),
    (400000, "400"),
    (512000, "512"),
    (650000, "650"),
    (1000000, "1000"),
];

impl Default for DataTransferJobConfig {
    fn default() -> Self {
        Self {
            sizes: DATA_TRANSFER_SIZES
                .iter()
                .map(|&(bytes, label)| PayloadSize {
                    bytes,
                    label: label.to_string(),
                })
                .collect(),
            partial_len: 13,
            trim: TrimParams::default(),
            output: "Payload_Latency_DataTransfer.png".into(),
            partial_output: "Payload_Latency_DataTransfer_partial.png".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub concurrency: ConcurrencyJobConfig,
    pub payload: PayloadJobConfig,
    pub data_transfer: DataTransferJobConfig,
}

impl PlotConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse plot config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Load `explicit` if given, else the per-user config file if one exists,
    /// else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        match default_config_path() {
            Some(p) if p.is_file() => {
                tracing::info!(path = %p.display(), "using config file");
                Self::load(&p)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/openwhisk-bench-plots/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("openwhisk-bench-plots").join("config.json"))
}
