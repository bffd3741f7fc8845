//! Sentinel-delimited grouping of benchmark rows.
//!
//! The harness writes each configuration's rows contiguously and closes every
//! configuration with a row at a known load level. Grouping is therefore a fold
//! over the rows in file order: values pile up in an accumulator until a
//! closing row hands them to that row's key. Nothing checks that the input
//! honours this layout. Out-of-order input gives deterministic but meaningless
//! groups.

use crate::error::PipelineError;
use crate::metrics;
use indexmap::IndexMap;
use std::hash::Hash;

/// Groups in first-seen key order.
pub type Grouped<K, V> = IndexMap<K, Vec<V>>;

/// Accumulator plus the groups closed so far.
#[derive(Debug, Clone)]
pub struct GroupFold<K, V> {
    pending: Vec<V>,
    groups: Grouped<K, V>,
}

impl<K: Hash + Eq, V> Default for GroupFold<K, V> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            groups: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> GroupFold<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: V) {
        self.pending.push(value);
    }

    /// Values accumulated since the last close.
    #[cfg(test)]
    fn pending(&self) -> &[V] {
        &self.pending
    }

    /// Hand the accumulator to `key` and start a fresh one. A key closed twice
    /// keeps its original position and takes the newer values.
    pub fn close(&mut self, key: K) {
        let finished = std::mem::take(&mut self.pending);
        self.groups.insert(key, finished);
    }

    /// Closed groups. Anything still pending after the last close is dropped.
    pub fn finish(self) -> Grouped<K, V> {
        self.groups
    }
}

/// Group row values by key, closing a group on every sentinel row.
///
/// Rows are numbered from 1 (the first data row) in errors.
/// `value` runs on every row before `keep` is consulted, so a malformed field
/// fails the scan even on a row that would have been filtered out. The sentinel
/// row contributes its own value when it passes `keep`.
pub fn build_grouped_series<R, K, V>(
    rows: &[R],
    key: impl Fn(&R) -> K,
    keep: impl Fn(&R) -> bool,
    value: impl Fn(&R, usize) -> Result<V, PipelineError>,
    is_sentinel: impl Fn(&R) -> bool,
) -> Result<Grouped<K, V>, PipelineError>
where
    K: Hash + Eq,
{
    let mut fold = GroupFold::new();
    for (idx, row) in rows.iter().enumerate() {
        let v = value(row, idx + 1)?;
        if keep(row) {
            fold.push(v);
        }
        if is_sentinel(row) {
            fold.close(key(row));
        }
    }
    Ok(fold.finish())
}

/// Per-label `(x, mean)` points.
pub type AveragedSeries<X> = IndexMap<String, Vec<(X, f64)>>;

/// Average the values between consecutive boundary rows and file each mean
/// under the boundary row's label.
///
/// The accumulator spans labels: it is reset at boundary rows only, never when
/// the label changes. `labels` fixes the output order and every label appears
/// even if no boundary row names it. A boundary row with an unknown label, or
/// one reached with nothing accumulated, is an error.
pub fn build_averaged_series<R, X>(
    rows: &[R],
    labels: &[String],
    label: impl Fn(&R) -> Option<&str>,
    x: impl Fn(&R) -> X,
    keep: impl Fn(&R) -> bool,
    value: impl Fn(&R, usize) -> Result<i64, PipelineError>,
    is_boundary: impl Fn(&R) -> bool,
) -> Result<AveragedSeries<X>, PipelineError> {
    let mut out: AveragedSeries<X> = labels.iter().map(|l| (l.clone(), Vec::new())).collect();
    let mut acc: Vec<i64> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 1;
        let v = value(row, row_no)?;
        if keep(row) {
            acc.push(v);
        }
        if !is_boundary(row) {
            continue;
        }

        let name = label(row).unwrap_or_default();
        let Some(points) = out.get_mut(name) else {
            return Err(PipelineError::UnknownLabel {
                row: row_no,
                label: name.to_string(),
                known: labels.to_vec(),
            });
        };
        let Some(mean) = metrics::mean_i64(&acc) else {
            return Err(PipelineError::EmptyAccumulator { row: row_no });
        };
        tracing::debug!(row = row_no, label = name, samples = acc.len(), mean, "closed boundary");
        points.push((x(row), mean));
        acc.clear();
    }

    Ok(out)
}

/// Project averaged points onto a fixed x axis, checking every series covers it.
pub fn project_means<X>(
    series: &AveragedSeries<X>,
    axis_len: usize,
) -> Result<Vec<(String, Vec<f64>)>, PipelineError> {
    series
        .iter()
        .map(|(name, points)| {
            if points.len() != axis_len {
                return Err(PipelineError::SeriesLengthMismatch {
                    label: name.clone(),
                    expected: axis_len,
                    found: points.len(),
                });
            }
            Ok((name.clone(), points.iter().map(|(_, m)| *m).collect()))
        })
        .collect()
}
