//! Serde-loaded configuration.
//!
//! [`ToolkitConfig`] holds the settings shared by every tool (paths,
//! thresholds, resolutions, plotting palette) and is passed explicitly into
//! scene loading, metric construction and the evaluation pipeline. The
//! per-binary configs embed it under a `toolkit` key.
pub mod evaluation;
pub mod meta;
pub mod overview;
pub mod resolve;
pub mod validation;

use crate::image::Interpolation;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DIR_NAME_DISP_MAPS: &str = "disp_maps";
pub const DIR_NAME_RUNTIMES: &str = "runtimes";

/// Default plotting palette, assigned positionally to algorithms.
pub const DEFAULT_PALETTE: [[u8; 3]; 19] = [
    [31, 119, 180],  // blue
    [255, 127, 14],  // orange
    [44, 160, 44],   // green
    [214, 39, 40],   // red
    [148, 103, 189], // violet
    [140, 86, 75],   // brown
    [227, 119, 194], // rose
    [127, 127, 127], // grey
    [188, 189, 34],  // yellow green
    [23, 190, 207],  // cyan
    [153, 0, 153],   // magenta
    [255, 210, 0],   // yellow
    [152, 223, 138], // light lime green
    [46, 6, 224],    // purple
    [196, 156, 148], // misty rose
    [247, 182, 210], // rose
    [199, 199, 199], // light grey
    [219, 219, 141], // light green
    [158, 218, 229], // light blue
];

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the scene data (`<data_path>/<category>/<scene>/`).
    pub data_path: PathBuf,
    /// Root of algorithm submissions (`<algo_path>/<algo>/disp_maps`, `runtimes`).
    pub algo_path: PathBuf,
    /// Root of evaluation output.
    pub eval_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("../data"),
            algo_path: PathBuf::from("../algo_results"),
            eval_path: PathBuf::from("../evaluation"),
        }
    }
}

impl PathsConfig {
    /// Per-algorithm evaluation results (`<eval_path>/algorithms`).
    pub fn algo_eval_path(&self) -> PathBuf {
        self.eval_path.join("algorithms")
    }

    pub fn meta_data_path(&self) -> PathBuf {
        self.algo_path.join("meta_data.json")
    }

    pub fn algo_dir(&self, algo_name: &str) -> PathBuf {
        self.algo_path.join(algo_name)
    }

    pub fn algo_eval_dir(&self, algo_name: &str) -> PathBuf {
        self.algo_eval_path().join(algo_name)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub paths: PathsConfig,
    pub bad_pix_thresh: f64,
    /// Scale factor of the high-resolution evaluation grid.
    pub high_res_scale: f64,
    /// Ignored margin (pixels at low resolution) on every image side.
    pub boundary_offset: usize,
    pub submission_width: usize,
    pub submission_height: usize,
    /// Interpolation used when scene rasters are resampled to an
    /// intermediate scale. Masks and label maps always use nearest.
    pub resample_order: Interpolation,
    /// Pixelize per-pixel visualizations of scenes with hidden ground truth.
    pub pixelize_hidden: bool,
    pub palette: Vec<[u8; 3]>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            bad_pix_thresh: 0.07,
            high_res_scale: 10.0,
            boundary_offset: 15,
            submission_width: 512,
            submission_height: 512,
            resample_order: Interpolation::Nearest,
            pixelize_hidden: true,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl ToolkitConfig {
    /// Palette entry `idx` (wrapping) as RGB in `[0, 1]`.
    pub fn color(&self, idx: usize) -> [f64; 3] {
        let rgb = if self.palette.is_empty() {
            DEFAULT_PALETTE[idx % DEFAULT_PALETTE.len()]
        } else {
            self.palette[idx % self.palette.len()]
        };
        rgb.map(|c| c as f64 / 255.0)
    }
}

pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_benchmark_settings() {
        let cfg: ToolkitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.bad_pix_thresh, 0.07);
        assert_eq!(cfg.high_res_scale, 10.0);
        assert_eq!(cfg.palette.len(), 19);
        assert_eq!(
            cfg.paths.algo_eval_path(),
            PathBuf::from("../evaluation").join("algorithms")
        );
        assert_eq!(cfg.color(19), cfg.color(0));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg: ToolkitConfig =
            serde_json::from_str(r#"{"paths": {"data_path": "/data"}, "resample_order": "linear"}"#)
                .unwrap();
        assert_eq!(cfg.paths.data_path, PathBuf::from("/data"));
        assert_eq!(cfg.paths.algo_path, PathBuf::from("../algo_results"));
        assert_eq!(cfg.resample_order, Interpolation::Linear);
    }
}
