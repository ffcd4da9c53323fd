//! Metrics on semantic regions of photorealistic scenes: surface bumpiness,
//! normal angular error and fattening/thinning at fine structures.
//!
//! The bumpiness kernel is shared with the Pyramids scene metrics.
use super::general::predicate_output;
use super::stats::median;
use super::{BumpinessParams, MetricOutput};
use crate::filters::hessian_norm;
use crate::image::{ImageF32, ImageF64, Mask};
use crate::scene::Scene;

/// Clipped Hessian norm of `algo − gt`.
pub fn bumpiness_map(algo: &ImageF32, gt: &ImageF32, clip: f64) -> ImageF64 {
    let diff = algo.zip_map(gt, |a, g| a - g);
    hessian_norm(&diff, clip)
}

pub fn bumpiness(
    params: &BumpinessParams,
    algo: &ImageF32,
    gt: &ImageF32,
    mut eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    let bump = bumpiness_map(algo, gt, params.clip);
    eval_mask.and_assign(&Mask::finite_f64(&bump));
    let selected = eval_mask.select(&bump);
    // 0 / 0 is NaN for an empty selection
    let score = params.factor * selected.iter().sum::<f64>() / selected.len() as f64;
    let vis = bump.map(|b| b * params.factor);
    MetricOutput::new(score, vis, eval_mask, with_vis)
}

/// Angle in degrees between the surface normals of `algo` and `gt`.
pub fn angular_error(algo: &ImageF32, gt: &ImageF32, scene: &Scene) -> ImageF64 {
    let algo_normals = scene.depth_normals(&scene.disp_to_depth(algo));
    let gt_normals = scene.depth_normals(&scene.disp_to_depth(gt));
    algo_normals.angular_error(&gt_normals)
}

/// Median angular error of the surface normals.
pub fn mae(
    algo: &ImageF32,
    gt: &ImageF32,
    scene: &Scene,
    mut eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    let err = angular_error(algo, gt, scene);
    eval_mask.and_assign(&Mask::finite_f32(algo));
    eval_mask.and_assign(&Mask::finite_f64(&err));
    let score = median(&eval_mask.select(&err));
    MetricOutput::new(score, err, eval_mask, with_vis)
}

/// Pixels with `gt − algo < thresh` (the estimate lies in front of the
/// surface by more than `|thresh|`).
pub fn fattening_mask(algo: &ImageF32, gt: &ImageF32, thresh: f64) -> Mask {
    Mask::from_predicate(&gt.zip_map(algo, |g, a| g - a), |d| d < thresh)
}

/// Pixels with `gt − algo > thresh`.
pub fn thinning_mask(algo: &ImageF32, gt: &ImageF32, thresh: f64) -> Mask {
    Mask::from_predicate(&gt.zip_map(algo, |g, a| g - a), |d| d > thresh)
}

pub fn fine_fattening(
    thresh: f64,
    algo: &ImageF32,
    gt: &ImageF32,
    eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    predicate_output(fattening_mask(algo, gt, thresh), eval_mask, with_vis)
}

pub fn fine_thinning(
    thresh: f64,
    algo: &ImageF32,
    gt: &ImageF32,
    eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    predicate_output(thinning_mask(algo, gt, thresh), eval_mask, with_vis)
}
