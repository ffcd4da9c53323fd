//! Scene-specific breakdowns of the stratified scenes.
use super::Series;
use crate::algorithms::{Algorithm, AlgorithmStore};
use crate::error::EvalError;
use crate::image::{ImageF32, LabelMap, Mask, Raster};
use crate::metrics::general::masked_mse;
use crate::metrics::stats::{median, percentage};
use crate::metrics::stratified::{fattening, thinning};
use crate::metrics::MseParams;
use crate::scene::regions::{
    MASK_BACKGROUND, MASK_BOXES, MASK_FOREGROUND_FATTENING, MASK_FOREGROUND_THINNING,
    MASK_SPHERE_IN, MASK_SPHERE_OUT, MASK_VERTICAL_BINS,
};
use crate::scene::{Resolution, Scene};
use serde::Serialize;
use std::collections::BTreeMap;

/// Ground-truth disparities are grouped at this precision.
const PYRAMIDS_DISP_FACTOR: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FatteningThinningSeries {
    pub fattening: Series,
    pub thinning: Series,
}

/// Backgammon fattening and thinning percentages per vertical bin
/// (`1..=n_bins` in `mask_vertical_bins`), at high resolution.
pub fn backgammon_fattening_thinning(
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    scene: &Scene,
    n_bins: usize,
) -> Result<Vec<FatteningThinningSeries>, EvalError> {
    let res = Resolution::High;
    let gt = scene.gt(res)?;
    let m_eval = scene.boundary_mask(res);
    let m_fat = scene.mask(MASK_FOREGROUND_FATTENING, res)?.and(&m_eval);
    let m_thin = scene.mask(MASK_FOREGROUND_THINNING, res)?.and(&m_eval);
    let bins = scene.labels(MASK_VERTICAL_BINS, res)?;
    let fg = scene.fg_extrapolation(&gt, res);
    let bg = scene.bg_extrapolation(&gt);
    let x: Vec<f64> = (0..n_bins).map(|i| i as f64).collect();

    let mut out = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let algo = store.load_algo_result(algorithm.name(), scene, res)?;
        let fat = fattening(&algo, &gt, &fg).and(&m_eval);
        let thin = thinning(&algo, &gt, &bg).and(&m_eval);
        out.push(FatteningThinningSeries {
            fattening: Series {
                algorithm: algorithm.file_name.clone(),
                x: x.clone(),
                y: bin_scores(&bins, n_bins, &m_fat, &fat),
            },
            thinning: Series {
                algorithm: algorithm.file_name.clone(),
                x: x.clone(),
                y: bin_scores(&bins, n_bins, &m_thin, &thin),
            },
        });
    }
    Ok(out)
}

/// Percentage of `hits` inside `region` for each bin label `1..=n_bins`.
pub fn bin_scores(bins: &LabelMap, n_bins: usize, region: &Mask, hits: &Mask) -> Vec<f64> {
    (1..=n_bins)
        .map(|label| {
            let in_bin = u8::try_from(label)
                .map(|l| bins.eq_mask(l).and(region))
                .unwrap_or_else(|_| Mask::filled(region.w, region.h, false));
            percentage(in_bin.count(), hits.count_and(&in_bin))
        })
        .collect()
}

/// Dots background MSE per box id (ascending, background label 0 skipped),
/// at low resolution. `x` holds the box ids.
pub fn dots_per_box_mse(
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    scene: &Scene,
) -> Result<Vec<Series>, EvalError> {
    let res = Resolution::Low;
    let gt = scene.gt(res)?;
    let boxes = scene.labels(MASK_BOXES, res)?;
    let box_ids: Vec<u8> = boxes.unique_labels().into_iter().filter(|&b| b != 0).collect();
    let m_eval = scene
        .mask(MASK_BACKGROUND, res)?
        .and(&scene.boundary_mask(res))
        .and(&Mask::finite_f32(&gt));
    let factor = MseParams::default().factor;

    let mut out = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let algo = store.load_algo_result(algorithm.name(), scene, res)?;
        let valid = m_eval.and(&Mask::finite_f32(&algo));
        let y = box_ids
            .iter()
            .map(|&b| masked_mse(&algo, &gt, &valid.and(&boxes.eq_mask(b)), factor))
            .collect();
        out.push(Series {
            algorithm: algorithm.file_name.clone(),
            x: box_ids.iter().map(|&b| b as f64).collect(),
            y,
        });
    }
    Ok(out)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidsSeries {
    pub sphere_in: Series,
    pub sphere_out: Series,
}

/// Median estimated disparity per ground-truth disparity (grouped at
/// 1/1000) inside the inner and outer spheres of the Pyramids scene.
/// Ground-truth values without any estimate in a region are skipped.
pub fn pyramids_disp_vs_gt(
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    scene: &Scene,
) -> Result<Vec<PyramidsSeries>, EvalError> {
    let res = Resolution::Low;
    let gt = scene.gt(res)?;
    let m_eval = scene.boundary_mask(res);
    let sphere_in = scene.mask(MASK_SPHERE_IN, res)?.and(&m_eval);
    let sphere_out = scene.mask(MASK_SPHERE_OUT, res)?.and(&m_eval);

    let mut out = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let algo = store.load_algo_result(algorithm.name(), scene, res)?;
        out.push(PyramidsSeries {
            sphere_in: disp_medians(algorithm, &algo, &gt, &sphere_in),
            sphere_out: disp_medians(algorithm, &algo, &gt, &sphere_out),
        });
    }
    Ok(out)
}

fn rounded_disp(v: f32) -> Option<i64> {
    // truncation towards zero
    v.is_finite().then(|| (v as f64 * PYRAMIDS_DISP_FACTOR) as i64)
}

fn disp_medians(algorithm: &Algorithm, algo: &ImageF32, gt: &ImageF32, region: &Mask) -> Series {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (x, y, g) in gt.pixels() {
        let a = algo.get(x, y);
        if !region.get(x, y) || !a.is_finite() {
            continue;
        }
        if let Some(level) = rounded_disp(g) {
            groups.entry(level).or_default().push(a as f64);
        }
    }
    let (x, y) = groups
        .into_iter()
        .map(|(level, values)| (level as f64 / PYRAMIDS_DISP_FACTOR, median(&values)))
        .unzip();
    Series {
        algorithm: algorithm.file_name.clone(),
        x,
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_report_percentages_and_nan_for_empty_bins() {
        let bins = LabelMap::from_vec(4, 1, vec![1, 1, 2, 2]).unwrap();
        let region = Mask::filled(4, 1, true);
        let hits = Mask::from_fn(4, 1, |x, _| x == 0);
        let scores = bin_scores(&bins, 3, &region, &hits);
        assert_eq!(scores[0], 50.0);
        assert_eq!(scores[1], 0.0);
        assert!(scores[2].is_nan());
    }

    #[test]
    fn disp_medians_group_by_rounded_gt() {
        let gt = ImageF32::from_vec(4, 1, vec![0.1, 0.1, 0.2, 0.2]).unwrap();
        let algo = ImageF32::from_vec(4, 1, vec![0.0, 0.4, 0.3, f32::NAN]).unwrap();
        let region = Mask::from_fn(4, 1, |x, _| x != 1);
        let series = disp_medians(&Algorithm::new("epi1"), &algo, &gt, &region);
        assert_eq!(series.x.len(), 2);
        assert!((series.y[0] - 0.0).abs() < 1e-9);
        assert!((series.y[1] - 0.3).abs() < 1e-6);
    }
}
