//! Scalar statistics used by the plotting jobs.
//!
//! Quantiles use linear interpolation between closest ranks, so the values line
//! up with the historical plots.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of integer samples. The sum is taken in `i128` so no run of `i64`
/// values can overflow it.
pub fn mean_i64(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Quantile `q` of an already sorted slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Linear-interpolation quantile of `values` (`q` in `[0, 1]`).
#[cfg(test)]
fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    Some(quantile_sorted(&sorted_copy(values), q))
}

/// Outcome of a quantile trim: the bounds used and the samples kept, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedMean {
    pub low_bound: f64,
    pub high_bound: f64,
    pub retained: Vec<i64>,
    pub mean: f64,
}

/// Drop samples outside the open interval between the `low` and `high` quantiles
/// and average the rest.
pub fn trimmed_mean(samples: &[i64], low: f64, high: f64) -> Result<TrimmedMean, PipelineError> {
    if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
        return Err(PipelineError::InvalidQuantiles { low, high });
    }
    if samples.is_empty() {
        return Err(PipelineError::EmptyRetainedSet { low, high });
    }

    let values: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let sorted = sorted_copy(&values);
    let low_bound = quantile_sorted(&sorted, low);
    let high_bound = quantile_sorted(&sorted, high);

    let retained: Vec<i64> = samples
        .iter()
        .copied()
        .filter(|&s| (s as f64) > low_bound && (s as f64) < high_bound)
        .collect();
    let Some(mean) = mean_i64(&retained) else {
        return Err(PipelineError::EmptyRetainedSet { low, high });
    };

    Ok(TrimmedMean {
        low_bound,
        high_bound,
        retained,
        mean,
    })
}

/// Everything a box-and-whisker glyph needs, with outliers hidden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub count: usize,
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub mean: f64,
}

/// Whisker reach as a multiple of the inter-quartile range.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Compute box-plot statistics. The whiskers stop at the most extreme samples
/// still within `WHISKER_IQR_FACTOR * IQR` of the box.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;

    let low_limit = q1 - WHISKER_IQR_FACTOR * iqr;
    let high_limit = q3 + WHISKER_IQR_FACTOR * iqr;
    let whisker_low = sorted
        .iter()
        .copied()
        .find(|&v| v >= low_limit)
        .map_or(q1, |v| v.min(q1));
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_limit)
        .map_or(q3, |v| v.max(q3));

    Some(BoxStats {
        count: sorted.len(),
        whisker_low,
        q1,
        median,
        q3,
        whisker_high,
        mean: mean(values)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_matches_linear_interpolation() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        assert!((quantile(&values, 0.2).unwrap() - 4.8).abs() < 1e-9);
        assert!((quantile(&values, 0.85).unwrap() - 17.15).abs() < 1e-9);
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(20.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn trimmed_mean_of_one_to_twenty() {
        let samples: Vec<i64> = (1..=20).collect();
        let t = trimmed_mean(&samples, 0.2, 0.85).unwrap();
        assert_eq!(t.retained, (5..=17).collect::<Vec<_>>());
        assert_eq!(t.mean, 11.0);
    }

    #[test]
    fn trimmed_mean_keeps_input_order() {
        let samples = vec![9, 1, 5, 7, 3, 8, 2, 6, 4, 10];
        let t = trimmed_mean(&samples, 0.2, 0.85).unwrap();
        // bounds are 2.8 and 8.65
        assert_eq!(t.retained, vec![5, 7, 3, 8, 6, 4]);
    }

    #[test]
    fn trimmed_mean_of_constant_samples_is_empty() {
        let samples = vec![7; 20];
        assert!(matches!(
            trimmed_mean(&samples, 0.2, 0.85),
            Err(PipelineError::EmptyRetainedSet { .. })
        ));
    }

    #[test]
    fn trimmed_mean_rejects_inverted_bounds() {
        assert!(matches!(
            trimmed_mean(&[1, 2, 3], 0.9, 0.1),
            Err(PipelineError::InvalidQuantiles { .. })
        ));
    }

    #[test]
    fn integer_mean_does_not_overflow() {
        assert_eq!(mean_i64(&[]), None);
        assert_eq!(mean_i64(&[i64::MAX, i64::MAX]), Some(i64::MAX as f64));
        assert_eq!(mean_i64(&[i64::MIN, i64::MAX]), Some(-0.5));
    }

    #[test]
    fn trimmed_mean_of_large_samples() {
        // the retained samples sum well past i64::MAX
        let base: i64 = 1 << 62;
        let step: i64 = 1 << 40;
        let samples: Vec<i64> = (1..=20).map(|i| base + i * step).collect();
        let t = trimmed_mean(&samples, 0.2, 0.85).unwrap();
        assert_eq!(t.retained.len(), 13);
        assert_eq!(t.mean, (base + 11 * step) as f64);
    }

    #[test]
    fn box_stats_hides_outliers() {
        let mut values: Vec<f64> = (1..=10).map(f64::from).collect();
        values.push(1000.0);
        let b = box_stats(&values).unwrap();
        assert_eq!(b.count, 11);
        assert_eq!(b.median, 6.0);
        assert_eq!(b.q1, 3.5);
        assert_eq!(b.q3, 8.5);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 10.0);
    }

    #[test]
    fn box_stats_single_value() {
        let b = box_stats(&[42.0]).unwrap();
        assert_eq!(b.whisker_low, 42.0);
        assert_eq!(b.whisker_high, 42.0);
        assert_eq!(b.median, 42.0);
        assert!(box_stats(&[]).is_none());
    }
}
