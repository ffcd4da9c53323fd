//! Scalar reductions shared by the metrics and the analysis series.

/// `100 · part / total`, NaN for an empty total.
pub fn percentage(total: usize, part: usize) -> f64 {
    if total == 0 {
        return f64::NAN;
    }
    100.0 * part as f64 / total as f64
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median with the two middle values averaged for even counts. Values are
/// expected to be finite; NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_of_sorted(&sorted)
}

pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Element at sorted index `⌊n · p / 100⌋` (clamped to the last element).
pub fn quantile_by_index(values: &[f64], percentage: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let idx = (sorted.len() as f64 * percentage / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}
