//! Metrics applicable to every scene: BadPix, MSE and error quantiles.
//!
//! Differences are computed in `f64`. Comparisons against a non-finite
//! difference are false, so invalid algorithm pixels count as good pixels in
//! the BadPix family while MSE and quantiles exclude them explicitly.
use super::stats::{mean, percentage, quantile_by_index};
use super::{MetricOutput, QuantileParams};
use crate::image::{ImageF32, ImageF64, Mask};

/// Pixels with `|algo − gt| > thresh`.
pub fn bad_pix_mask(algo: &ImageF32, gt: &ImageF32, thresh: f64) -> Mask {
    let diffs = algo.zip_map(gt, |a, g| a - g);
    Mask::from_predicate(&diffs, |d| d.abs() > thresh)
}

/// Percentage of selected pixels set in `predicate`. The visualization shows
/// the predicate in binary rendering, restricted to `eval_mask`.
pub(crate) fn predicate_output(predicate: Mask, eval_mask: Mask, with_vis: bool) -> MetricOutput {
    let score = percentage(eval_mask.count(), predicate.count_and(&eval_mask));
    MetricOutput::new(score, predicate.to_binary_vis(), eval_mask, with_vis)
}

pub fn bad_pix(
    thresh: f64,
    algo: &ImageF32,
    gt: &ImageF32,
    eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    predicate_output(bad_pix_mask(algo, gt, thresh), eval_mask, with_vis)
}

/// BadPix of a flat list of differences; NaN when empty.
pub fn bad_pix_from_diffs(diffs: &[f64], thresh: f64) -> f64 {
    let bad = diffs.iter().filter(|d| d.abs() > thresh).count();
    percentage(diffs.len(), bad)
}

/// Mean of `(gt − algo)²` over `mask`, times `factor`.
pub fn masked_mse(algo: &ImageF32, gt: &ImageF32, mask: &Mask, factor: f64) -> f64 {
    let squared = gt.zip_map(algo, |g, a| (g - a) * (g - a));
    mean(&mask.select(&squared)) * factor
}

pub fn mse(
    factor: f64,
    algo: &ImageF32,
    gt: &ImageF32,
    mut eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    eval_mask.and_assign(&Mask::finite_f32(algo));
    eval_mask.and_assign(&Mask::finite_f32(gt));
    let score = masked_mse(algo, gt, &eval_mask, factor);
    let diff = gt.zip_map(algo, |g, a| g - a);
    MetricOutput::new(score, diff, eval_mask, with_vis)
}

/// Error at the `p`-th percentile by sorted index, times `factor`. The
/// visualization marks errors above the score with `-1`.
pub fn quantile(
    params: &QuantileParams,
    algo: &ImageF32,
    gt: &ImageF32,
    mut eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    let diffs = algo.zip_map(gt, |a, g| (a - g).abs() * params.factor);
    eval_mask.and_assign(&Mask::finite_f64(&diffs));
    eval_mask.and_assign(&Mask::finite_f32(algo));
    let score = quantile_by_index(&eval_mask.select(&diffs), params.percentage as f64);
    let vis: ImageF64 = diffs.map(|d| if d > score { -1.0 } else { d });
    MetricOutput::new(score, vis, eval_mask, with_vis)
}
