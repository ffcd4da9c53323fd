//! Percentage of pixels within a range of error thresholds, pooled over
//! scenes.
use super::Series;
use crate::algorithms::{Algorithm, AlgorithmStore};
use crate::error::EvalError;
use crate::image::{ImageF64, Mask};
use crate::metrics::general::bad_pix_from_diffs;
use crate::metrics::Metric;
use crate::scene::{Resolution, Scene};
use log::info;

/// Offset added to the largest threshold for penalised invalid pixels.
const MISSING_PIXEL_PENALTY: f64 = 100.0;

/// Thresholds `0.000, 0.002, …, 0.100`.
pub fn default_thresholds() -> Vec<f64> {
    (0..=50).map(|i| i as f64 * 0.002).collect()
}

/// For each algorithm, `100 − BadPix(t)` per threshold `t` over the pooled
/// low-resolution absolute errors of all `scenes`.
///
/// With `penalize_missing_pixels`, non-finite estimates count as errors
/// above every threshold; otherwise they are dropped.
pub fn bad_pix_series(
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    scenes: &[Scene],
    thresholds: &[f64],
    penalize_missing_pixels: bool,
) -> Result<Vec<Series>, EvalError> {
    let max_diff = thresholds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let metric = Metric::bad_pix(0.0);
    let mut out = Vec::with_capacity(algorithms.len());

    for algorithm in algorithms {
        info!("Computing BadPix scores for: {}", algorithm.display_name);
        let mut combined = Vec::new();
        for scene in scenes {
            let gt = scene.gt(Resolution::Low)?;
            let algo = store.load_algo_result(algorithm.name(), scene, Resolution::Low)?;
            let diffs = algo.zip_map(&gt, |a, g| (a - g).abs());
            let valid = Mask::finite_f32(&algo).and(&Mask::finite_f64(&diffs));
            let eval = metric.evaluation_mask(scene, Resolution::Low)?;

            if penalize_missing_pixels {
                let penalty = max_diff + MISSING_PIXEL_PENALTY;
                let penalised = ImageF64::from_fn(diffs.w, diffs.h, |x, y| {
                    if valid.get(x, y) {
                        diffs.get(x, y)
                    } else {
                        penalty
                    }
                });
                combined.extend(eval.select(&penalised));
            } else {
                combined.extend(eval.and(&valid).select(&diffs));
            }
        }

        let y = thresholds
            .iter()
            .map(|&t| 100.0 - bad_pix_from_diffs(&combined, t))
            .collect();
        out.push(Series {
            algorithm: algorithm.file_name.clone(),
            x: thresholds.to_vec(),
            y,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_cover_zero_to_a_tenth() {
        let t = default_thresholds();
        assert_eq!(t.len(), 51);
        assert_eq!(t[0], 0.0);
        assert!((t[50] - 0.1).abs() < 1e-12);
        assert!(t.iter().any(|v| (v - 0.07).abs() < 1e-12));
    }
}
