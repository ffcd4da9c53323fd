//! Per-pixel error differences between two estimates.
use crate::algorithms::{AlgorithmStore, MetaAlgorithm};
use crate::error::EvalError;
use crate::image::{ImageF32, ImageF64};
use crate::scene::{Resolution, Scene};

/// `|a1 − gt| − |a2 − gt|`: negative where the first estimate is closer.
pub fn error_difference(first: &ImageF32, second: &ImageF32, gt: &ImageF32) -> ImageF64 {
    ImageF64::from_fn(gt.w, gt.h, |x, y| {
        let g = gt.get(x, y) as f64;
        (first.get(x, y) as f64 - g).abs() - (second.get(x, y) as f64 - g).abs()
    })
}

/// Error difference of two submitted algorithms on `scene` at low
/// resolution.
pub fn pairwise_diff(
    store: &AlgorithmStore,
    first: &str,
    second: &str,
    scene: &Scene,
) -> Result<ImageF64, EvalError> {
    let res = Resolution::Low;
    let gt = scene.gt(res)?;
    let a1 = store.load_algo_result(first, scene, res)?;
    let a2 = store.load_algo_result(second, scene, res)?;
    Ok(error_difference(&a1, &a2, &gt))
}

/// `|meta − gt| − |algo − gt|`: negative where the meta-algorithm is
/// closer. The meta-algorithm must have been computed beforehand.
pub fn meta_algo_diff(
    store: &AlgorithmStore,
    meta: MetaAlgorithm,
    algo_name: &str,
    scene: &Scene,
) -> Result<ImageF64, EvalError> {
    pairwise_diff(store, meta.file_name(), algo_name, scene)
}
