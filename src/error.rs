use thiserror::Error;

/// Failures of the aggregation pipeline. None of them are retried: the job that
/// hits one stops.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("row {row}: field `{field}` is not a valid integer: {value:?}")]
    MalformedField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("row {row}: payload label {label:?} is not one of {known:?}")]
    UnknownLabel {
        row: usize,
        label: String,
        known: Vec<String>,
    },

    #[error("row {row}: boundary row reached with no accumulated samples")]
    EmptyAccumulator { row: usize },

    #[error("expected at least {expected} sample lines, found {found}")]
    TooFewSamples { expected: usize, found: usize },

    #[error("line {line}: sample is not a valid integer: {value:?}")]
    MalformedSample { line: usize, value: String },

    #[error("no samples left strictly between the {low} and {high} quantiles")]
    EmptyRetainedSet { low: f64, high: f64 },

    #[error("invalid quantile bounds: low {low}, high {high}")]
    InvalidQuantiles { low: f64, high: f64 },

    #[error("series {label:?} has {found} points but the x axis has {expected}")]
    SeriesLengthMismatch {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("failed to read samples")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV input")]
    Csv(#[from] csv::Error),
}
