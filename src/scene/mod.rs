//! Benchmark scenes.
//!
//! A [`Scene`] is loaded once from `<data_path>/<category>/<name>/` and is
//! immutable afterwards. Every read of per-pixel data takes an explicit
//! [`Resolution`]; the returned raster always has shape
//! [`Scene::shape`]`(resolution)`, which is checked at load time.
//!
//! Low resolution reads the `*_lowres` files directly. High resolution reads
//! the `*_highres` files and resamples them only when the configured
//! high-res scale differs from the scene's stored `depth_map_scale`.
pub mod catalog;
pub mod geometry;
pub mod params;
pub mod regions;
pub mod stratified;

pub use catalog::{infer_category, SceneCategory};
pub use geometry::NormalMap;
pub use params::SceneParameters;
pub use regions::RegionIndex;

use crate::config::ToolkitConfig;
use crate::error::EvalError;
use crate::image::{io, pfm, resample, ImageF32, Interpolation, LabelMap, Mask};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Evaluation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Low,
    High,
}

impl Resolution {
    /// File suffix of data authored at this resolution.
    pub fn suffix(self) -> &'static str {
        match self {
            Resolution::Low => "lowres",
            Resolution::High => "highres",
        }
    }
}

/// Synthetic scenes designed around a single difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StratifiedKind {
    Backgammon,
    Dots,
    Pyramids,
    Stripes,
}

impl StratifiedKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "backgammon" => Some(StratifiedKind::Backgammon),
            "dots" => Some(StratifiedKind::Dots),
            "pyramids" => Some(StratifiedKind::Pyramids),
            "stripes" => Some(StratifiedKind::Stripes),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StratifiedKind::Backgammon => "Backgammon",
            StratifiedKind::Dots => "Dots",
            StratifiedKind::Pyramids => "Pyramids",
            StratifiedKind::Stripes => "Stripes",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Stratified(StratifiedKind),
    Photorealistic,
}

#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    display_name: String,
    category: SceneCategory,
    kind: SceneKind,
    data_path: PathBuf,
    pub params: SceneParameters,
    boundary_offset: usize,
    high_res_scale: f64,
    resample_order: Interpolation,
    regions: RegionIndex,
}

impl Scene {
    /// Load a scene, inferring its category from the built-in name lists.
    pub fn load(name: &str, config: &ToolkitConfig) -> Result<Self, EvalError> {
        Self::load_with_category(name, infer_category(name), config)
    }

    pub fn load_with_category(
        name: &str,
        category: SceneCategory,
        config: &ToolkitConfig,
    ) -> Result<Self, EvalError> {
        let data_path = config.paths.data_path.join(category.as_str()).join(name);
        let params = SceneParameters::from_file(&data_path.join("parameters.cfg"))?;
        let regions = RegionIndex::scan(&data_path)?;

        let kind = match category {
            SceneCategory::Stratified => {
                let kind = StratifiedKind::from_name(name).ok_or_else(|| EvalError::Parameters {
                    path: data_path.clone(),
                    reason: format!("unknown stratified scene: {name}"),
                })?;
                SceneKind::Stratified(kind)
            }
            _ => SceneKind::Photorealistic,
        };

        let scene = Self {
            name: name.to_string(),
            display_name: title_case(name),
            category,
            kind,
            data_path,
            params,
            boundary_offset: config.boundary_offset,
            high_res_scale: config.high_res_scale,
            resample_order: config.resample_order,
            regions,
        };
        debug!(
            "Loaded scene {} ({category}): {}x{} px, focal plane at disparity {:.3}, regions: {}",
            scene.name,
            scene.params.width,
            scene.params.height,
            scene.compute_offset(),
            scene.regions.names().into_iter().collect::<Vec<_>>().join(", ")
        );
        Ok(scene)
    }

    /// Name of the scene directory; also the key in results files.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> SceneCategory {
        self.category
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn stratified_kind(&self) -> Option<StratifiedKind> {
        match self.kind {
            SceneKind::Stratified(k) => Some(k),
            SceneKind::Photorealistic => None,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn is_test(&self) -> bool {
        self.category == SceneCategory::Test
    }

    pub fn is_stratified(&self) -> bool {
        self.category == SceneCategory::Stratified
    }

    /// Ground truth of test scenes is not distributed.
    pub fn hidden_gt(&self) -> bool {
        self.is_test()
    }

    /// Resolution at which general metrics are evaluated on this scene.
    pub fn general_metric_resolution(&self) -> Resolution {
        match self.kind {
            SceneKind::Stratified(
                StratifiedKind::Backgammon | StratifiedKind::Dots | StratifiedKind::Stripes,
            ) => Resolution::High,
            _ => Resolution::Low,
        }
    }

    pub fn scale(&self, resolution: Resolution) -> f64 {
        match resolution {
            Resolution::Low => 1.0,
            Resolution::High => self.high_res_scale,
        }
    }

    pub fn width(&self, resolution: Resolution) -> usize {
        (self.params.width as f64 * self.scale(resolution)) as usize
    }

    pub fn height(&self, resolution: Resolution) -> usize {
        (self.params.height as f64 * self.scale(resolution)) as usize
    }

    /// `(height, width)` at the given resolution.
    pub fn shape(&self, resolution: Resolution) -> (usize, usize) {
        (self.height(resolution), self.width(resolution))
    }

    pub fn boundary_offset(&self, resolution: Resolution) -> usize {
        (self.boundary_offset as f64 * self.scale(resolution)) as usize
    }

    /// Index of the central camera of the grid.
    pub fn center_cam(&self) -> usize {
        self.params.num_cams_x * self.params.num_cams_y / 2
    }

    /// True everywhere except a margin of [`Scene::boundary_offset`] pixels.
    pub fn boundary_mask(&self, resolution: Resolution) -> Mask {
        let (h, w) = self.shape(resolution);
        let off = self.boundary_offset(resolution);
        Mask::from_fn(w, h, |x, y| {
            x >= off && y >= off && x + off < w && y + off < h
        })
    }

    /// Ground-truth disparity.
    pub fn gt(&self, resolution: Resolution) -> Result<ImageF32, EvalError> {
        self.disp_map(resolution)
    }

    pub fn disp_map(&self, resolution: Resolution) -> Result<ImageF32, EvalError> {
        self.load_raster("gt_disp", resolution)
    }

    /// Ground-truth depth in metres.
    pub fn depth_map(&self, resolution: Resolution) -> Result<ImageF32, EvalError> {
        self.load_raster("gt_depth", resolution)
    }

    /// Binary region; every non-zero pixel belongs to it.
    pub fn mask(&self, name: &str, resolution: Resolution) -> Result<Mask, EvalError> {
        let path = self.data_file(name, resolution, "png");
        let mut mask = io::load_mask(&path)?;
        if self.needs_resample(resolution) {
            let (h, w) = self.shape(resolution);
            mask = resample::resize_mask(&mask, w, h);
        }
        self.check_shape(name, mask.shape(), resolution)?;
        Ok(mask)
    }

    /// Region file whose pixel values are ids.
    pub fn labels(&self, name: &str, resolution: Resolution) -> Result<LabelMap, EvalError> {
        let path = self.data_file(name, resolution, "png");
        let mut labels = io::load_label_map(&path)?;
        if self.needs_resample(resolution) {
            let (h, w) = self.shape(resolution);
            labels = resample::resize_labels(&labels, w, h);
        }
        self.check_shape(name, labels.shape(), resolution)?;
        Ok(labels)
    }

    /// Center view of the camera grid, resampled to the requested grid.
    pub fn center_view(&self, resolution: Resolution) -> Result<RgbImage, EvalError> {
        let path = self
            .data_path
            .join(format!("input_Cam{:03}.png", self.center_cam()));
        let view = io::load_rgb_image(&path)?;
        let (h, w) = self.shape(resolution);
        if (view.height() as usize, view.width() as usize) == (h, w) {
            return Ok(view);
        }
        Ok(resample::resize_rgb(&view, w, h))
    }

    fn needs_resample(&self, resolution: Resolution) -> bool {
        resolution == Resolution::High && self.high_res_scale != self.params.highres_scale
    }

    fn data_file(&self, descr: &str, resolution: Resolution, ext: &str) -> PathBuf {
        self.data_path
            .join(format!("{descr}_{}.{ext}", resolution.suffix()))
    }

    fn load_raster(&self, descr: &str, resolution: Resolution) -> Result<ImageF32, EvalError> {
        let path = self.data_file(descr, resolution, "pfm");
        let mut data = pfm::read_pfm(&path)?;
        if self.needs_resample(resolution) {
            let (h, w) = self.shape(resolution);
            data = resample::resize_f32(&data, w, h, self.resample_order);
        }
        self.check_shape(descr, data.shape(), resolution)?;
        Ok(data)
    }

    pub(crate) fn check_shape(
        &self,
        what: &str,
        actual: (usize, usize),
        resolution: Resolution,
    ) -> Result<(), EvalError> {
        let expected = self.shape(resolution);
        if actual != expected {
            return Err(EvalError::ShapeMismatch {
                what: format!("{what} of scene {}", self.name),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
impl Scene {
    /// Photorealistic `width`×`height` scene without files on disk:
    /// focal length 100 mm, sensor 35 mm, baseline 90 mm, focus at 8 m.
    pub(crate) fn in_memory(width: usize, height: usize) -> Self {
        let params = SceneParameters {
            width,
            height,
            focal_length_mm: 100.0,
            sensor_size_mm: 35.0,
            num_cams_x: 9,
            num_cams_y: 9,
            baseline_mm: 90.0,
            focus_distance_m: 8.0,
            disp_min: -1.5,
            disp_max: 1.5,
            highres_scale: 2.0,
        };
        Self {
            name: "dino".to_string(),
            display_name: "Dino".to_string(),
            category: SceneCategory::Training,
            kind: SceneKind::Photorealistic,
            data_path: PathBuf::new(),
            high_res_scale: params.highres_scale,
            params,
            boundary_offset: 0,
            resample_order: Interpolation::Nearest,
            regions: RegionIndex::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("backgammon"), "Backgammon");
        assert_eq!(title_case("medieval2"), "Medieval2");
        assert_eq!(title_case("my_scene"), "My_Scene");
    }
}
