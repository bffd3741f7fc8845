use crate::error::PipelineError;
use crate::metrics::{BoxStats, TrimmedMean};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Marker the load generator appends to the round-trip time column.
pub const MSEC_SUFFIX: &str = "(msec)";

/// One observed request outcome as written by the load-test harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    #[serde(rename = "ow concurrency")]
    pub ow_concurrency: i64,
    #[serde(rename = "loadtestconcurrency")]
    pub load_concurrency: i64,
    pub errors: i64,
    #[serde(rename = "realtotaltime(msec)")]
    pub total_time: String,
    pub rps: String,
    #[serde(rename = "payloadfile", default)]
    pub payload_file: Option<String>,
}

impl SampleRow {
    /// Round-trip time in milliseconds with the `(msec)` marker stripped.
    pub fn total_time_ms(&self, row: usize) -> Result<i64, PipelineError> {
        let raw = self.total_time.replace(MSEC_SUFFIX, "");
        raw.trim()
            .parse::<i64>()
            .map_err(|_| PipelineError::MalformedField {
                row,
                field: "realtotaltime(msec)",
                value: self.total_time.clone(),
            })
    }

    /// Requests per second, truncated toward zero. Values that do not fit an
    /// `i64` are malformed.
    pub fn rps_truncated(&self, row: usize) -> Result<i64, PipelineError> {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        const I64_RANGE: std::ops::Range<f64> = (i64::MIN as f64)..(i64::MAX as f64);

        let raw = self.rps.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(v);
        }
        match raw.parse::<f64>().map(f64::trunc) {
            Ok(v) if I64_RANGE.contains(&v) => Ok(v as i64),
            _ => Err(PipelineError::MalformedField {
                row,
                field: "rps",
                value: self.rps.clone(),
            }),
        }
    }
}

/// Which column a series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Latency,
    Throughput,
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::Latency, Measure::Throughput];

    /// Extract this measure from a row. `row` is only used for error reporting.
    pub fn value(self, sample: &SampleRow, row: usize) -> Result<i64, PipelineError> {
        match self {
            Measure::Latency => sample.total_time_ms(row),
            Measure::Throughput => sample.rps_truncated(row),
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Measure::Latency => "Latency(ms)",
            Measure::Throughput => "Throughput(Request per Second)",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Measure::Latency => "Concurrency-Latency",
            Measure::Throughput => "Concurrency-Throughput",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Measure::Latency => "latency",
            Measure::Throughput => "throughput",
        }
    }
}

/// Parse sample rows from any CSV source with a header line.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<SampleRow>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Parse sample rows from a CSV file.
pub fn load_rows(path: &Path) -> anyhow::Result<Vec<SampleRow>> {
    use anyhow::Context;
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rows = read_rows(file).with_context(|| format!("parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded sample rows");
    Ok(rows)
}

/// Summary of one group of a box-plot measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: i64,
    pub samples: Vec<i64>,
    pub stats: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedMeasure {
    pub measure: Measure,
    pub groups: Vec<GroupSummary>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyReport {
    pub source: PathBuf,
    pub measures: Vec<GroupedMeasure>,
}

/// Averaged points of one payload label, as `(platform concurrency, mean)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSeries {
    pub label: String,
    pub points: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedMeasure {
    pub measure: Measure,
    pub x_axis: Vec<i64>,
    pub series: Vec<LabelSeries>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadReport {
    pub source: PathBuf,
    pub measures: Vec<AveragedMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPoint {
    pub bytes: u64,
    pub label: String,
    pub source: PathBuf,
    pub trimmed: TrimmedMean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransferReport {
    pub points: Vec<TransferPoint>,
    /// Number of leading points shown on the partial plot.
    pub partial_len: usize,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub partial_output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobReport {
    Concurrency(ConcurrencyReport),
    Payload(PayloadReport),
    DataTransfer(DataTransferReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub version: String,
    pub jobs: Vec<JobReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
ow concurrency,loadtestconcurrency,errors,realtotaltime(msec),rps,extra
1,10,0,120(msec),35,x
1,30,12,98(msec),40.9,y
";

    #[test]
    fn reads_rows_and_ignores_extra_columns() {
        let rows = read_rows(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ow_concurrency, 1);
        assert_eq!(rows[1].load_concurrency, 30);
        assert_eq!(rows[1].errors, 12);
        assert_eq!(rows[0].payload_file, None);
    }

    #[test]
    fn measures_strip_suffix_and_truncate() {
        let rows = read_rows(CSV.as_bytes()).unwrap();
        assert_eq!(Measure::Latency.value(&rows[0], 0).unwrap(), 120);
        assert_eq!(Measure::Throughput.value(&rows[1], 1).unwrap(), 40);
    }

    #[test]
    fn malformed_time_is_an_error() {
        let mut row = read_rows(CSV.as_bytes()).unwrap().remove(0);
        row.total_time = "fast(msec)".into();
        let err = Measure::Latency.value(&row, 7).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedField { row: 7, .. }));
    }

    #[test]
    fn out_of_range_rps_is_malformed() {
        let mut row = read_rows(CSV.as_bytes()).unwrap().remove(0);
        for bad in ["1e30", "-1e30", "99999999999999999999", "inf", "NaN"] {
            row.rps = bad.into();
            let err = Measure::Throughput.value(&row, 3).unwrap_err();
            assert!(
                matches!(err, PipelineError::MalformedField { row: 3, field: "rps", .. }),
                "{bad} was accepted"
            );
        }
        row.rps = "-0.9".into();
        assert_eq!(Measure::Throughput.value(&row, 3).unwrap(), 0);
    }

    #[test]
    fn reads_payload_column() {
        let csv = "ow concurrency,loadtestconcurrency,errors,realtotaltime(msec),rps,payloadfile\n\
                   2,10,0,5(msec),1,timeout30payload1K\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].payload_file.as_deref(), Some("timeout30payload1K"));
    }
}
