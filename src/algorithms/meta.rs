//! Per-pixel aggregates over a set of submitted algorithms.
//!
//! A meta-algorithm is computed once per scene set and persisted into the
//! regular submission layout, after which it is scored like any other
//! algorithm. Aggregation always runs at low resolution.
use super::{Algorithm, AlgorithmStore};
use crate::error::EvalError;
use crate::image::ImageF32;
use crate::metrics::stats::{mean, median};
use crate::scene::{Resolution, Scene};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaAlgorithm {
    /// Oracle: value of the algorithm closest to the ground truth.
    PerPixBest,
    PerPixMean,
    /// Value whose error has the median rank across algorithms.
    PerPixMedianDiff,
    PerPixMedianDisp,
}

impl MetaAlgorithm {
    pub const ALL: [MetaAlgorithm; 4] = [
        MetaAlgorithm::PerPixBest,
        MetaAlgorithm::PerPixMean,
        MetaAlgorithm::PerPixMedianDiff,
        MetaAlgorithm::PerPixMedianDisp,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            MetaAlgorithm::PerPixBest => "per_pix_best",
            MetaAlgorithm::PerPixMean => "per_pix_mean",
            MetaAlgorithm::PerPixMedianDiff => "per_pix_median_diff",
            MetaAlgorithm::PerPixMedianDisp => "per_pix_median_disp",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MetaAlgorithm::PerPixBest => "PerPixBest",
            MetaAlgorithm::PerPixMean => "PerPixMean",
            MetaAlgorithm::PerPixMedianDiff => "PerPixMedianDiff",
            MetaAlgorithm::PerPixMedianDisp => "PerPixMedianDisp",
        }
    }

    /// Fixed grey level used for plotting.
    pub fn color(self) -> [f64; 3] {
        let v = match self {
            MetaAlgorithm::PerPixBest => 0.0,
            MetaAlgorithm::PerPixMean => 0.6,
            MetaAlgorithm::PerPixMedianDiff => 0.2,
            MetaAlgorithm::PerPixMedianDisp => 0.4,
        };
        [v, v, v]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.file_name() == name)
    }

    /// Algorithm handle under which the results are stored and scored.
    pub fn algorithm(self) -> Algorithm {
        Algorithm::meta(self.file_name(), self.display_name(), self.color())
    }

    fn needs_gt(self) -> bool {
        matches!(
            self,
            MetaAlgorithm::PerPixBest | MetaAlgorithm::PerPixMedianDiff
        )
    }

    /// Scalar runtime of the meta-algorithm from the input runtimes.
    pub fn aggregate_runtime(self, runtimes: &[f64]) -> f64 {
        match self {
            MetaAlgorithm::PerPixMean => mean(runtimes),
            MetaAlgorithm::PerPixMedianDiff | MetaAlgorithm::PerPixMedianDisp => median(runtimes),
            MetaAlgorithm::PerPixBest => runtimes.iter().copied().fold(f64::NAN, f64::min),
        }
    }

    /// Aggregate of one pixel; `values[i]` is algorithm `i`'s disparity.
    /// Non-finite values are excluded; the result is NaN when nothing valid
    /// remains.
    pub fn aggregate_pixel(self, values: &[f32], gt: f32) -> f32 {
        match self {
            MetaAlgorithm::PerPixMean => {
                let valid: Vec<f64> = valid_values(values).collect();
                mean(&valid) as f32
            }
            MetaAlgorithm::PerPixMedianDisp => {
                let valid: Vec<f64> = valid_values(values).collect();
                median(&valid) as f32
            }
            MetaAlgorithm::PerPixBest => best_value(values, gt),
            MetaAlgorithm::PerPixMedianDiff => median_diff_value(values, gt),
        }
    }

    /// Combine same-shaped results pixel by pixel.
    pub fn combine(self, results: &[ImageF32], gt: Option<&ImageF32>) -> ImageF32 {
        let Some(first) = results.first() else {
            return ImageF32::new(0, 0);
        };
        let (w, h) = (first.w, first.h);
        let pixel = |i: usize| {
            let (x, y) = (i % w, i / w);
            let values: Vec<f32> = results.iter().map(|r| r.get(x, y)).collect();
            let g = gt.map_or(f32::NAN, |g| g.get(x, y));
            self.aggregate_pixel(&values, g)
        };

        #[cfg(feature = "parallel")]
        let data: Vec<f32> = (0..w * h).into_par_iter().map(pixel).collect();
        #[cfg(not(feature = "parallel"))]
        let data: Vec<f32> = (0..w * h).map(pixel).collect();

        ImageF32 {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// Aggregate `algorithms` on every scene and persist disparity maps and
    /// runtimes under [`Self::file_name`] in `store`.
    pub fn compute_meta_results(
        self,
        store: &AlgorithmStore,
        algorithms: &[Algorithm],
        scenes: &[Scene],
    ) -> Result<(), EvalError> {
        if algorithms.is_empty() {
            return Err(EvalError::NoAlgorithms {
                name: self.file_name().to_string(),
            });
        }
        for scene in scenes {
            info!("Computing {} for scene {}", self.display_name(), scene.name());
            let runtimes = algorithms
                .iter()
                .map(|a| store.load_runtime(a.name(), scene))
                .collect::<Result<Vec<_>, _>>()?;
            store.save_runtime(self.file_name(), scene, self.aggregate_runtime(&runtimes))?;

            let results = algorithms
                .iter()
                .map(|a| store.load_algo_result(a.name(), scene, Resolution::Low))
                .collect::<Result<Vec<_>, _>>()?;
            let gt = if self.needs_gt() {
                Some(scene.gt(Resolution::Low)?)
            } else {
                None
            };
            debug!(
                "{}: {} inputs of shape {:?}",
                self.file_name(),
                results.len(),
                scene.shape(Resolution::Low)
            );
            let combined = self.combine(&results, gt.as_ref());
            store.save_algo_result(self.file_name(), scene, &combined)?;
        }
        Ok(())
    }
}

/// Compute every meta-algorithm in `metas` in order.
pub fn prepare_meta_algorithms(
    metas: &[MetaAlgorithm],
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    scenes: &[Scene],
) -> Result<(), EvalError> {
    for meta in metas {
        meta.compute_meta_results(store, algorithms, scenes)?;
    }
    Ok(())
}

fn valid_values(values: &[f32]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter(|v| v.is_finite()).map(|&v| v as f64)
}

fn best_value(values: &[f32], gt: f32) -> f32 {
    let mut best: Option<(f32, f32)> = None;
    for &v in values.iter().filter(|v| v.is_finite()) {
        let err = (gt - v).abs();
        match best {
            Some((_, best_err)) if !(err < best_err) => {}
            _ => best = Some((v, err)),
        }
    }
    best.map_or(f32::NAN, |(v, _)| v)
}

fn median_diff_value(values: &[f32], gt: f32) -> f32 {
    let n = values.len();
    if n == 0 {
        return f32::NAN;
    }
    // errors ascending, invalid inputs ranked last
    let mut errors: Vec<Option<f64>> = values
        .iter()
        .map(|&v| v.is_finite().then(|| (gt as f64 - v as f64).abs()))
        .collect();
    errors.sort_by(|a, b| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mid = n / 2;
    let err = if n % 2 == 1 {
        errors[mid]
    } else {
        match (errors[mid - 1], errors[mid]) {
            (Some(a), Some(b)) => Some(0.5 * (a + b)),
            _ => None,
        }
    };
    err.map_or(f32::NAN, |e| (gt as f64 - e) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_picks_smallest_error() {
        let gt = 1.0;
        let values = [1.3, 0.95, 1.2];
        assert_eq!(MetaAlgorithm::PerPixBest.aggregate_pixel(&values, gt), 0.95);
        assert!(MetaAlgorithm::PerPixBest
            .aggregate_pixel(&[f32::NAN, f32::INFINITY], gt)
            .is_nan());
    }

    #[test]
    fn median_diff_averages_middle_ranks_for_even_counts() {
        let gt = 2.0f32;
        let values = [2.4, 1.9, 2.3, 1.8];
        let out = MetaAlgorithm::PerPixMedianDiff.aggregate_pixel(&values, gt);
        assert!(((gt - out) as f64 - 0.25).abs() < 1e-6, "out={out}");

        let odd = MetaAlgorithm::PerPixMedianDiff.aggregate_pixel(&[2.4, 1.9, 2.3], gt);
        assert!(((gt - odd) as f64 - 0.3).abs() < 1e-6, "odd={odd}");
    }

    #[test]
    fn median_diff_ranks_invalid_last() {
        let gt = 0.0f32;
        // ranks: 0.1, 0.5, NaN -> middle rank is valid
        let out = MetaAlgorithm::PerPixMedianDiff.aggregate_pixel(&[f32::NAN, 0.5, -0.1], gt);
        assert!((out + 0.5).abs() < 1e-6);
        // ranks: 0.1, NaN, NaN -> middle rank is invalid
        let out = MetaAlgorithm::PerPixMedianDiff.aggregate_pixel(&[f32::NAN, f32::NAN, 0.1], gt);
        assert!(out.is_nan());
    }

    #[test]
    fn mean_and_median_skip_invalid() {
        let values = [1.0, f32::NAN, 3.0, 8.0];
        assert_eq!(MetaAlgorithm::PerPixMean.aggregate_pixel(&values, f32::NAN), 4.0);
        assert_eq!(MetaAlgorithm::PerPixMedianDisp.aggregate_pixel(&values, f32::NAN), 3.0);
        assert_eq!(MetaAlgorithm::PerPixMedianDisp.aggregate_pixel(&[1.0, 2.0], 0.0), 1.5);
    }

    #[test]
    fn runtimes_aggregate_per_kind() {
        let runtimes = [4.0, 1.0, 10.0];
        assert_eq!(MetaAlgorithm::PerPixBest.aggregate_runtime(&runtimes), 1.0);
        assert_eq!(MetaAlgorithm::PerPixMean.aggregate_runtime(&runtimes), 5.0);
        assert_eq!(MetaAlgorithm::PerPixMedianDisp.aggregate_runtime(&runtimes), 4.0);
    }

    #[test]
    fn combine_runs_per_pixel() {
        let a = ImageF32::from_fn(2, 2, |x, _| x as f32);
        let b = ImageF32::from_fn(2, 2, |_, y| 2.0 * y as f32);
        let out = MetaAlgorithm::PerPixMean.combine(&[a, b], None);
        assert_eq!(out.shape(), (2, 2));
        assert_eq!(out.get(1, 1), 1.5);
        assert_eq!(MetaAlgorithm::from_name("per_pix_mean"), Some(MetaAlgorithm::PerPixMean));
    }
}
