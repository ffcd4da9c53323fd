//! Supplementary per-algorithm series and difference maps that go beyond
//! the scalar scores in `results.json`.
//!
//! Every function reads submissions through an [`AlgorithmStore`] and
//! returns plain data; rendering is left to the caller.
//!
//! [`AlgorithmStore`]: crate::algorithms::AlgorithmStore
pub mod bad_pix_series;
pub mod comparisons;
pub mod stratified;

pub use bad_pix_series::{bad_pix_series, default_thresholds};
pub use comparisons::{meta_algo_diff, pairwise_diff};
pub use stratified::{
    backgammon_fattening_thinning, dots_per_box_mse, pyramids_disp_vs_gt, FatteningThinningSeries,
    PyramidsSeries,
};

use serde::Serialize;

/// One curve of an analysis plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Algorithm file name.
    pub algorithm: String,
    pub x: Vec<f64>,
    /// NaN where the underlying selection is empty.
    pub y: Vec<f64>,
}
