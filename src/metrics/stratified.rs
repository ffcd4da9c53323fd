//! Scene-specific metrics of the stratified scenes.
//!
//! Backgammon compares the estimate against the half-way point between the
//! ground truth and an extrapolated foreground (or background) plane. Dots
//! count missed dots per box instead of pixels.
use super::general::{bad_pix_from_diffs, predicate_output};
use super::stats::percentage;
use super::{MetricOutput, MissedDotsParams};
use crate::error::EvalError;
use crate::image::{ImageF32, ImageF64, LabelMap, Mask};
use crate::scene::regions::{MASK_BOXES, MASK_DOTS_BY_SIZE};
use crate::scene::{Resolution, Scene};
use log::debug;

/// Only the eight largest dot size classes (labels below 9) are scored.
const MAX_DOT_LABEL: u8 = 9;

/// Pixels whose estimate lies closer to the extrapolated foreground than
/// to the ground truth.
pub fn fattening(algo: &ImageF32, gt: &ImageF32, fg: &ImageF64) -> Mask {
    Mask::from_fn(algo.w, algo.h, |x, y| {
        let half = 0.5 * (fg.get(x, y) + gt.get(x, y) as f64);
        (algo.get(x, y) as f64) > half
    })
}

/// Pixels whose estimate lies closer to the extrapolated background than
/// to the ground truth.
pub fn thinning(algo: &ImageF32, gt: &ImageF32, bg: &ImageF64) -> Mask {
    Mask::from_fn(algo.w, algo.h, |x, y| {
        let half = 0.5 * (bg.get(x, y) + gt.get(x, y) as f64);
        (algo.get(x, y) as f64) < half
    })
}

pub fn backgammon_fattening(
    algo: &ImageF32,
    gt: &ImageF32,
    fg: &ImageF64,
    eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    predicate_output(fattening(algo, gt, fg), eval_mask, with_vis)
}

pub fn backgammon_thinning(
    algo: &ImageF32,
    gt: &ImageF32,
    bg: &ImageF64,
    eval_mask: Mask,
    with_vis: bool,
) -> MetricOutput {
    predicate_output(thinning(algo, gt, bg), eval_mask, with_vis)
}

/// Percentage of missed dots on the Dots scene.
pub fn missed_dots(
    params: &MissedDotsParams,
    algo: &ImageF32,
    gt: &ImageF32,
    scene: &Scene,
    resolution: Resolution,
    with_vis: bool,
) -> Result<MetricOutput, EvalError> {
    let boxes = scene.labels(MASK_BOXES, resolution)?;
    let dots_by_size = scene.labels(MASK_DOTS_BY_SIZE, resolution)?;
    let diffs = gt.zip_map(algo, |g, a| (g - a).abs());
    Ok(count_missed_dots(params, &diffs, &boxes, &dots_by_size, with_vis))
}

pub(crate) fn count_missed_dots(
    params: &MissedDotsParams,
    diffs: &ImageF64,
    boxes: &LabelMap,
    dots_by_size: &LabelMap,
    with_vis: bool,
) -> MetricOutput {
    let box_ids: Vec<u8> = boxes.unique_labels().into_iter().filter(|&b| b != 0).collect();
    let n_dots = dots_by_size
        .unique_labels()
        .into_iter()
        .filter(|&l| l > 0 && l < MAX_DOT_LABEL)
        .count();
    let total = n_dots * box_ids.len();

    let mut missed = Mask::filled(diffs.w, diffs.h, false);
    let mut detected = 0usize;
    for &box_id in &box_ids {
        let m_box = boxes.eq_mask(box_id);
        for size_class in 1..=n_dots as u8 {
            let dot = dots_by_size.eq_mask(size_class).and(&m_box);
            let bad_pix = bad_pix_from_diffs(&dot.select(diffs), params.thresh);
            // an empty dot scores NaN and counts as missed
            if bad_pix < params.missed_dot_bad_pix {
                detected += 1;
            } else {
                debug!("Missed dot: box {box_id}, size class {size_class}, BadPix {bad_pix:.2}");
                missed = missed.or(&dot);
            }
        }
    }

    let score = percentage(total, total - detected);
    let full = Mask::filled(diffs.w, diffs.h, true);
    MetricOutput::new(score, missed.to_binary_vis(), full, with_vis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backgammon_half_way_rule() {
        let gt = ImageF32::from_fn(3, 1, |_, _| 1.0);
        let fg = ImageF64::filled(3, 1, 2.0);
        let algo = ImageF32::from_fn(3, 1, |x, _| [1.4, 1.6, 1.5][x]);
        let fat = fattening(&algo, &gt, &fg);
        assert!(!fat.get(0, 0));
        assert!(fat.get(1, 0));
        assert!(!fat.get(2, 0));

        let bg = ImageF64::filled(3, 1, 0.0);
        let algo = ImageF32::from_fn(3, 1, |x, _| [0.4, 0.6, 0.5][x]);
        let thin = thinning(&algo, &gt, &bg);
        assert!(thin.get(0, 0));
        assert!(!thin.get(1, 0));
        assert!(!thin.get(2, 0));
    }

    #[test]
    fn missed_dots_counts_dots_not_pixels() {
        // two boxes side by side, three dot classes of two pixels each
        let (w, h) = (6, 2);
        let boxes = LabelMap::from_vec(w, h, (0..w * h).map(|i| 1 + ((i % w) / 3) as u8).collect())
            .unwrap();
        let dots = LabelMap::from_vec(w, h, (0..w * h).map(|i| 1 + (i % 3) as u8).collect()).unwrap();
        let mut diffs = ImageF64::filled(w, h, 0.0);
        // one pixel of one dot is bad: 50 % is not below 50 %, so it is missed
        diffs.set(4, 1, 1.0);

        let out = count_missed_dots(&MissedDotsParams::default(), &diffs, &boxes, &dots, true);
        assert!((out.score - 100.0 / 6.0).abs() < 1e-9, "score={}", out.score);
        let vis = out.visualization.unwrap();
        assert_eq!(vis.get(4, 0), Some(1.0));
        assert_eq!(vis.get(0, 0), Some(0.2));
    }
}
