//! Scoring functions comparing an algorithm's disparity map against ground
//! truth.
//!
//! [`Metric`] is a closed set of variants, each carrying its parameters as
//! plain data. A metric is identified by [`Metric::id`], which is also the
//! key of its scores in results files; equality and hashing go through the
//! id.
//!
//! Scoring is pure: every call receives the scene, the resolution to evaluate
//! at and rasters of the matching shape. [`Metric::resolution`] tells the
//! caller which resolution a metric needs on a given scene.
pub mod catalog;
pub mod general;
pub mod region;
pub mod stats;
pub mod stratified;

pub use catalog::{
    all_metrics, all_metrics_wo_runtime, general_metrics, metric_by_id, metric_group, region_metrics,
    stratified_metrics, METRIC_GROUP_NAMES,
};

use crate::error::EvalError;
use crate::image::{ImageF32, ImageF64, Mask};
use crate::scene::regions::*;
use crate::scene::{Resolution, Scene, SceneKind, StratifiedKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    General,
    #[serde(rename = "Photorealistic")]
    Region,
    Stratified,
}

/// Colour maps used to render metric visualizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Viridis,
    Seismic,
    #[serde(rename = "RdYlGn_r")]
    RdYlGnR,
    #[serde(rename = "YlOrRd")]
    YlOrRd,
    Gray,
}

/// Display range and colour map of a metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotHints {
    /// Range of the score axis.
    pub vmin: f64,
    pub vmax: f64,
    /// Colour range of per-pixel visualizations.
    pub cmin: f64,
    pub cmax: f64,
    pub colorbar_bins: usize,
    pub cmap: Colormap,
}

impl PlotHints {
    const fn new(vmin: f64, vmax: f64, colorbar_bins: usize, cmap: Colormap) -> Self {
        Self {
            vmin,
            vmax,
            cmin: vmin,
            cmax: vmax,
            colorbar_bins,
            cmap,
        }
    }

    const fn with_color_range(mut self, cmin: f64, cmax: f64) -> Self {
        self.cmin = cmin;
        self.cmax = cmax;
        self
    }
}

/// Per-pixel diagnostic of a score: `values` are only meaningful where
/// `mask` is set.
#[derive(Clone, Debug)]
pub struct Visualization {
    pub values: ImageF64,
    pub mask: Mask,
}

impl Visualization {
    /// Value at `(x, y)`, or `None` outside the mask.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.mask.get(x, y).then(|| self.values.get(x, y))
    }
}

/// Score and optional visualization of one metric evaluation.
#[derive(Clone, Debug)]
pub struct MetricOutput {
    pub score: f64,
    pub visualization: Option<Visualization>,
}

impl MetricOutput {
    pub(crate) fn new(score: f64, values: ImageF64, mask: Mask, with_vis: bool) -> Self {
        Self {
            score,
            visualization: with_vis.then_some(Visualization { values, mask }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadPixParams {
    /// Disparity error above which a pixel counts as bad.
    pub thresh: f64,
}

impl Default for BadPixParams {
    fn default() -> Self {
        Self { thresh: 0.07 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MseParams {
    pub factor: f64,
}

impl Default for MseParams {
    fn default() -> Self {
        Self { factor: 100.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantileParams {
    pub percentage: u32,
    pub factor: f64,
}

impl Default for QuantileParams {
    fn default() -> Self {
        Self {
            percentage: 25,
            factor: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BumpinessParams {
    /// Upper clamp of the per-pixel Hessian norm.
    pub clip: f64,
    pub factor: f64,
}

impl Default for BumpinessParams {
    fn default() -> Self {
        Self {
            clip: 0.05,
            factor: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MissedDotsParams {
    /// BadPix threshold applied per dot.
    pub thresh: f64,
    /// A dot whose BadPix score is not below this percentage is missed.
    pub missed_dot_bad_pix: f64,
}

impl Default for MissedDotsParams {
    fn default() -> Self {
        Self {
            thresh: 0.4,
            missed_dot_bad_pix: 50.0,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Metric {
    BadPix(BadPixParams),
    Mse(MseParams),
    Quantile(QuantileParams),
    /// Reported runtime in seconds; not computed from disparity maps.
    Runtime { log: bool },
    BumpinessPlanes(BumpinessParams),
    BumpinessContinSurf(BumpinessParams),
    MaePlanes,
    MaeContinSurf,
    Discontinuities(BadPixParams),
    FineFattening(BadPixParams),
    FineThinning(BadPixParams),
    BackgammonFattening(BadPixParams),
    BackgammonThinning(BadPixParams),
    PyramidsSlantedBumpiness(BumpinessParams),
    PyramidsParallelBumpiness(BumpinessParams),
    MissedDots(MissedDotsParams),
    DotsBackgroundMse(MseParams),
    StripesLowTexture(BadPixParams),
    DarkStripes(BadPixParams),
    BrightStripes(BadPixParams),
}

const BINARY_HINTS: PlotHints = PlotHints::new(0.0, 1.0, 1, Colormap::RdYlGnR);
const MSE_HINTS: PlotHints = PlotHints::new(-0.2, 0.2, 4, Colormap::Seismic);
const BUMPINESS_HINTS: PlotHints = PlotHints::new(0.0, 5.0, 5, Colormap::Viridis);

const LEGEND_BINARY: &str = "green = good, red = bad";
const LEGEND_SIGNED: &str = "white = correct, red = too far, blue = too close";
const LEGEND_BUMPINESS: &str = "purple = smooth, yellow = bumpy";

/// `%0.3f` of a threshold with the decimal point removed.
fn thresh_tag(value: f64) -> String {
    format!("{value:.3}").replace('.', "")
}

impl Metric {
    pub fn bad_pix(thresh: f64) -> Self {
        Metric::BadPix(BadPixParams { thresh })
    }

    pub fn mse() -> Self {
        Metric::Mse(MseParams::default())
    }

    pub fn quantile(percentage: u32) -> Self {
        Metric::Quantile(QuantileParams {
            percentage,
            ..QuantileParams::default()
        })
    }

    pub fn runtime(log: bool) -> Self {
        Metric::Runtime { log }
    }

    /// Key of the metric in results files.
    pub fn id(&self) -> String {
        match self {
            Metric::BadPix(p) => format!("badpix_{}", thresh_tag(p.thresh)),
            Metric::Mse(p) => format!("mse_{}", p.factor as i64),
            Metric::Quantile(p) => format!("q_{}_{}", p.percentage, p.factor as i64),
            Metric::Runtime { log: true } => "runtime_log".to_string(),
            Metric::Runtime { log: false } => "runtime".to_string(),
            Metric::BumpinessPlanes(p) => {
                format!("bumpiness_planes_{}_{}", p.factor as i64, thresh_tag(p.clip))
            }
            Metric::BumpinessContinSurf(p) => format!(
                "bumpiness_contin_surfaces_{}_{}",
                p.factor as i64,
                thresh_tag(p.clip)
            ),
            Metric::MaePlanes => "mae_planes".to_string(),
            Metric::MaeContinSurf => "mae_contin_surfaces".to_string(),
            Metric::Discontinuities(p) => format!("discontinuities_{}", thresh_tag(p.thresh)),
            Metric::FineFattening(p) => format!("fine_fattening_{}", thresh_tag(p.thresh.abs())),
            Metric::FineThinning(p) => format!("fine_thinning_{}", thresh_tag(p.thresh)),
            Metric::BackgammonFattening(p) => {
                format!("backgammon_fattening_{}", thresh_tag(p.thresh))
            }
            Metric::BackgammonThinning(p) => {
                format!("backgammon_thinning_{}", thresh_tag(p.thresh))
            }
            Metric::PyramidsSlantedBumpiness(p) => {
                format!("bumpiness_slanted_{}_{}", p.factor as i64, thresh_tag(p.clip))
            }
            Metric::PyramidsParallelBumpiness(p) => {
                format!("bumpiness_parallel_{}_{}", p.factor as i64, thresh_tag(p.clip))
            }
            Metric::MissedDots(p) => format!(
                "missed_dots_{}_{}",
                p.missed_dot_bad_pix as i64,
                thresh_tag(p.thresh)
            ),
            Metric::DotsBackgroundMse(p) => format!("background_mse_{}", p.factor as i64),
            Metric::StripesLowTexture(p) => format!("low_texture_{}", thresh_tag(p.thresh)),
            Metric::DarkStripes(p) => format!("dark_stripes_{}", thresh_tag(p.thresh)),
            Metric::BrightStripes(p) => format!("bright_stripes_{}", thresh_tag(p.thresh)),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Metric::BadPix(p) => format!("BadPix({:.2})", p.thresh),
            Metric::Mse(_) => "MSE".to_string(),
            Metric::Quantile(p) => format!("Q{}", p.percentage),
            Metric::Runtime { log: true } => "Runtime (log10)".to_string(),
            Metric::Runtime { log: false } => "Runtime".to_string(),
            Metric::BumpinessPlanes(_) => "Bumpiness Planes".to_string(),
            Metric::BumpinessContinSurf(_) => "Bumpiness Contin. Surfaces".to_string(),
            Metric::MaePlanes => "MAE Planes".to_string(),
            Metric::MaeContinSurf => "MAE Contin. Surfaces".to_string(),
            Metric::Discontinuities(_) => "Discontinuities".to_string(),
            Metric::FineFattening(_) => "Fine Fattening".to_string(),
            Metric::FineThinning(_) => "Fine Thinning".to_string(),
            _ => match self.stratified_kind() {
                Some(kind) => format!("{}: {}", kind.display_name(), self.short_name()),
                None => self.short_name(),
            },
        }
    }

    /// Compact name for table headers and figure axes.
    pub fn short_name(&self) -> String {
        let name = match self {
            Metric::BadPix(_) => "BadPix",
            Metric::Mse(_) | Metric::Quantile(_) => return self.display_name(),
            Metric::Runtime { log: true } => "Time (log10)",
            Metric::Runtime { log: false } => "Time",
            Metric::BumpinessPlanes(_) => "Planes",
            Metric::BumpinessContinSurf(_) => "Surfaces",
            Metric::MaePlanes => "MAE Planes",
            Metric::MaeContinSurf => "MAE Surfaces",
            Metric::Discontinuities(_) => "Discont.",
            Metric::FineFattening(_) => "Fine Fat",
            Metric::FineThinning(_) => "Fine Thin",
            Metric::BackgammonFattening(_) => "Fattening",
            Metric::BackgammonThinning(_) => "Thinning",
            Metric::PyramidsSlantedBumpiness(_) => "Bump. Slanted",
            Metric::PyramidsParallelBumpiness(_) => "Bump. Parallel",
            Metric::MissedDots(_) => "Missed Dots",
            Metric::DotsBackgroundMse(_) => "Background",
            Metric::StripesLowTexture(_) => "Low Texture",
            Metric::DarkStripes(_) => "Dark Stripes",
            Metric::BrightStripes(_) => "Bright Stripes",
        };
        name.to_string()
    }

    pub fn description(&self) -> String {
        match self {
            Metric::BadPix(p)
            | Metric::StripesLowTexture(p)
            | Metric::DarkStripes(p)
            | Metric::BrightStripes(p) => format!(
                "The percentage of pixels at the given mask with abs(gt - algo) > {:.2}.",
                p.thresh
            ),
            Metric::Mse(p) | Metric::DotsBackgroundMse(p) => format!(
                "The mean squared error over all pixels at the given mask, multiplied with {}.",
                p.factor as i64
            ),
            Metric::Quantile(p) => format!(
                "The {0}th percentile of the disparity errors: The maximum absolute disparity \
                 error of the best {0}% of pixels for each algorithm, multiplied by 100.",
                p.percentage
            ),
            Metric::Runtime { log: true } => "Decadic logarithm of the runtime in seconds as \
                 reported by the authors (hence runtime scores below 1 second are negative)."
                .to_string(),
            Metric::Runtime { log: false } => {
                "The runtime in seconds as reported by the authors.".to_string()
            }
            Metric::BumpinessPlanes(p)
            | Metric::PyramidsSlantedBumpiness(p)
            | Metric::PyramidsParallelBumpiness(p) => format!(
                "The average Frobenius norm of the Hessian matrix of (gt - algo) at the given \
                 plane regions, multiplied with {}.",
                p.factor as i64
            ),
            Metric::BumpinessContinSurf(p) => format!(
                "The average Frobenius norm of the Hessian matrix of (gt - algo) at smooth \
                 non-planar regions, multiplied with {}.",
                p.factor as i64
            ),
            Metric::MaePlanes => {
                "The median angular error of the surface normals at the given plane regions."
                    .to_string()
            }
            Metric::MaeContinSurf => "The median angular error of the surface normals at \
                 smooth, non-planar regions."
                .to_string(),
            Metric::Discontinuities(p) => format!(
                "The percentage of pixels at discontinuity regions with abs(gt - algo) > {:.2}.",
                p.thresh
            ),
            Metric::FineFattening(p) => format!(
                "The percentage of pixels around fine structures with (gt - algo) < {:.2}.",
                p.thresh
            ),
            Metric::FineThinning(p) => format!(
                "The percentage of pixels at fine structures with (gt - algo) > {:.2}.",
                p.thresh
            ),
            Metric::BackgammonFattening(_) => "The percentage of pixels around fine structures \
                 whose disparity estimate is closer to the foreground than to the background."
                .to_string(),
            Metric::BackgammonThinning(_) => "The percentage of pixels at fine structures whose \
                 disparity estimate is closer to the background than to the foreground."
                .to_string(),
            Metric::MissedDots(p) => format!(
                "The percentage of dots with a BadPix({:.2}) score > 50%.",
                p.thresh
            ),
        }
    }

    /// Caption explaining the colours of the visualization.
    pub fn legend(&self) -> String {
        match self {
            Metric::Mse(_) | Metric::DotsBackgroundMse(_) => LEGEND_SIGNED.to_string(),
            Metric::Quantile(p) => format!(
                "gray = errors above {}th percentile, white/yellow = good, red = relatively bad",
                p.percentage
            ),
            Metric::Runtime { .. } => String::new(),
            Metric::BumpinessPlanes(_)
            | Metric::BumpinessContinSurf(_)
            | Metric::PyramidsSlantedBumpiness(_)
            | Metric::PyramidsParallelBumpiness(_) => LEGEND_BUMPINESS.to_string(),
            _ => LEGEND_BINARY.to_string(),
        }
    }

    pub fn category(&self) -> MetricCategory {
        match self {
            Metric::BadPix(_) | Metric::Mse(_) | Metric::Quantile(_) | Metric::Runtime { .. } => {
                MetricCategory::General
            }
            Metric::BumpinessPlanes(_)
            | Metric::BumpinessContinSurf(_)
            | Metric::MaePlanes
            | Metric::MaeContinSurf
            | Metric::Discontinuities(_)
            | Metric::FineFattening(_)
            | Metric::FineThinning(_) => MetricCategory::Region,
            _ => MetricCategory::Stratified,
        }
    }

    pub fn is_general(&self) -> bool {
        self.category() == MetricCategory::General
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Metric::Runtime { .. })
    }

    /// Stratified scene a scene-specific metric belongs to.
    pub fn stratified_kind(&self) -> Option<StratifiedKind> {
        match self {
            Metric::BackgammonFattening(_) | Metric::BackgammonThinning(_) => {
                Some(StratifiedKind::Backgammon)
            }
            Metric::PyramidsSlantedBumpiness(_) | Metric::PyramidsParallelBumpiness(_) => {
                Some(StratifiedKind::Pyramids)
            }
            Metric::MissedDots(_) | Metric::DotsBackgroundMse(_) => Some(StratifiedKind::Dots),
            Metric::StripesLowTexture(_) | Metric::DarkStripes(_) | Metric::BrightStripes(_) => {
                Some(StratifiedKind::Stripes)
            }
            _ => None,
        }
    }

    /// Region file a photorealistic-scene metric requires.
    pub fn region_name(&self) -> Option<&'static str> {
        match self {
            Metric::BumpinessPlanes(_) | Metric::MaePlanes => Some(MASK_PLANES),
            Metric::BumpinessContinSurf(_) | Metric::MaeContinSurf => Some(MASK_SMOOTH_SURFACES),
            Metric::Discontinuities(_) => Some(MASK_DISCONTINUITIES),
            Metric::FineFattening(_) => Some(MASK_FINE_SURROUNDING),
            Metric::FineThinning(_) => Some(MASK_FINE),
            _ => None,
        }
    }

    pub fn plot_hints(&self) -> PlotHints {
        match self {
            Metric::BadPix(_)
            | Metric::Runtime { .. }
            | Metric::Discontinuities(_)
            | Metric::FineFattening(_)
            | Metric::FineThinning(_) => BINARY_HINTS,
            Metric::Mse(_) => MSE_HINTS,
            Metric::Quantile(_) => PlotHints::new(0.0, 0.5, 5, Colormap::YlOrRd),
            Metric::BumpinessPlanes(_) | Metric::BumpinessContinSurf(_) => BUMPINESS_HINTS,
            Metric::MaePlanes | Metric::MaeContinSurf => {
                PlotHints::new(0.0, 80.0, 5, Colormap::RdYlGnR)
            }
            Metric::BackgammonFattening(_) => {
                PlotHints::new(0.0, 22.0, 1, Colormap::RdYlGnR).with_color_range(0.0, 1.0)
            }
            Metric::BackgammonThinning(_) => {
                PlotHints::new(0.0, 3.0, 1, Colormap::RdYlGnR).with_color_range(0.0, 1.0)
            }
            Metric::PyramidsSlantedBumpiness(_) | Metric::PyramidsParallelBumpiness(_) => {
                PlotHints::new(0.0, 3.5, 5, Colormap::Viridis).with_color_range(0.0, 5.0)
            }
            Metric::MissedDots(_) => {
                PlotHints::new(0.0, 70.0, 1, Colormap::RdYlGnR).with_color_range(0.0, 1.0)
            }
            Metric::DotsBackgroundMse(_) => {
                PlotHints::new(0.0, 4.0, 4, Colormap::Seismic).with_color_range(-0.2, 0.2)
            }
            Metric::StripesLowTexture(_) | Metric::DarkStripes(_) | Metric::BrightStripes(_) => {
                PlotHints::new(0.0, 60.0, 1, Colormap::RdYlGnR).with_color_range(0.0, 1.0)
            }
        }
    }

    /// True for scores reported as percentages.
    pub fn is_percentage(&self) -> bool {
        !matches!(
            self,
            Metric::Mse(_)
                | Metric::Runtime { .. }
                | Metric::BumpinessPlanes(_)
                | Metric::BumpinessContinSurf(_)
                | Metric::MaePlanes
                | Metric::MaeContinSurf
                | Metric::PyramidsSlantedBumpiness(_)
                | Metric::PyramidsParallelBumpiness(_)
                | Metric::DotsBackgroundMse(_)
        )
    }

    pub fn format_score(&self, score: f64) -> String {
        if self.is_percentage() {
            format!("{score:.2}%")
        } else {
            format!("{score:.2}")
        }
    }

    /// Visualizations of this metric are pixelized on hidden-GT scenes.
    pub fn pixelize_results(&self) -> bool {
        let id = self.id();
        id.starts_with("mse") || id.starts_with("badpix") || id.starts_with('q')
    }

    /// Resolution this metric is evaluated at on `scene`.
    pub fn resolution(&self, scene: &Scene) -> Resolution {
        match self {
            Metric::BadPix(_) | Metric::Mse(_) | Metric::Quantile(_) | Metric::Runtime { .. } => {
                scene.general_metric_resolution()
            }
            Metric::BumpinessPlanes(_)
            | Metric::BumpinessContinSurf(_)
            | Metric::MaePlanes
            | Metric::MaeContinSurf
            | Metric::PyramidsSlantedBumpiness(_)
            | Metric::PyramidsParallelBumpiness(_) => Resolution::Low,
            _ => Resolution::High,
        }
    }

    /// Whether the metric yields a per-pixel score on `scene`. Runtimes are
    /// never applicable; region metrics need their region file at either
    /// resolution.
    pub fn is_applicable(&self, scene: &Scene) -> bool {
        if self.is_runtime() {
            return false;
        }
        match self.category() {
            MetricCategory::General => true,
            MetricCategory::Region => {
                scene.kind() == SceneKind::Photorealistic
                    && self
                        .region_name()
                        .is_some_and(|name| scene.regions().contains(name))
            }
            MetricCategory::Stratified => scene.stratified_kind() == self.stratified_kind(),
        }
    }

    /// Pixels that count towards the score, before validity filtering.
    pub fn evaluation_mask(&self, scene: &Scene, resolution: Resolution) -> Result<Mask, EvalError> {
        let boundary = scene.boundary_mask(resolution);
        let region = match self {
            Metric::BadPix(_)
            | Metric::Mse(_)
            | Metric::Quantile(_)
            | Metric::Runtime { .. }
            | Metric::MissedDots(_) => return Ok(boundary),
            Metric::BackgammonFattening(_) => MASK_FOREGROUND_FATTENING,
            Metric::BackgammonThinning(_) => MASK_FOREGROUND_THINNING,
            Metric::PyramidsSlantedBumpiness(_) => {
                return Ok(scene.objects_mask(resolution)?.and(&boundary));
            }
            Metric::PyramidsParallelBumpiness(_) => MASK_PLANE,
            Metric::DotsBackgroundMse(_) => MASK_BACKGROUND,
            Metric::StripesLowTexture(_) => MASK_LOW_TEXTURE,
            Metric::DarkStripes(_) => MASK_HIGH_CONTRAST,
            Metric::BrightStripes(_) => MASK_LOW_CONTRAST,
            _ => match self.region_name() {
                Some(name) => name,
                None => return Ok(boundary),
            },
        };
        Ok(scene.mask(region, resolution)?.and(&boundary))
    }

    /// Score of `algo` against `gt`, both at `resolution`.
    pub fn score(
        &self,
        algo: &ImageF32,
        gt: &ImageF32,
        scene: &Scene,
        resolution: Resolution,
    ) -> Result<f64, EvalError> {
        Ok(self.compute(algo, gt, scene, resolution, false)?.score)
    }

    pub fn score_with_visualization(
        &self,
        algo: &ImageF32,
        gt: &ImageF32,
        scene: &Scene,
        resolution: Resolution,
    ) -> Result<(f64, Visualization), EvalError> {
        let out = self.compute(algo, gt, scene, resolution, true)?;
        let vis = out
            .visualization
            .ok_or_else(|| EvalError::NotPixelMetric { id: self.id() })?;
        Ok((out.score, vis))
    }

    /// Runtime score from a reported runtime in seconds.
    pub fn runtime_score(&self, runtime: f64) -> Result<f64, EvalError> {
        match self {
            Metric::Runtime { log: true } => Ok(runtime.log10()),
            Metric::Runtime { log: false } => Ok(runtime),
            _ => Err(EvalError::NotPixelMetric { id: self.id() }),
        }
    }

    pub fn compute(
        &self,
        algo: &ImageF32,
        gt: &ImageF32,
        scene: &Scene,
        resolution: Resolution,
        with_vis: bool,
    ) -> Result<MetricOutput, EvalError> {
        if self.is_runtime() {
            return Err(EvalError::NotPixelMetric { id: self.id() });
        }
        scene.check_shape("algorithm result", algo.shape(), resolution)?;
        scene.check_shape("ground truth", gt.shape(), resolution)?;

        let eval_mask = self.evaluation_mask(scene, resolution)?;
        self.compute_masked(algo, gt, scene, resolution, eval_mask, with_vis)
    }

    fn compute_masked(
        &self,
        algo: &ImageF32,
        gt: &ImageF32,
        scene: &Scene,
        resolution: Resolution,
        eval_mask: Mask,
        with_vis: bool,
    ) -> Result<MetricOutput, EvalError> {
        let out = match self {
            Metric::BadPix(p)
            | Metric::Discontinuities(p)
            | Metric::StripesLowTexture(p)
            | Metric::DarkStripes(p)
            | Metric::BrightStripes(p) => general::bad_pix(p.thresh, algo, gt, eval_mask, with_vis),
            Metric::Mse(p) | Metric::DotsBackgroundMse(p) => {
                general::mse(p.factor, algo, gt, eval_mask, with_vis)
            }
            Metric::Quantile(p) => general::quantile(p, algo, gt, eval_mask, with_vis),
            Metric::BumpinessPlanes(p)
            | Metric::BumpinessContinSurf(p)
            | Metric::PyramidsSlantedBumpiness(p)
            | Metric::PyramidsParallelBumpiness(p) => {
                region::bumpiness(p, algo, gt, eval_mask, with_vis)
            }
            Metric::MaePlanes | Metric::MaeContinSurf => {
                region::mae(algo, gt, scene, eval_mask, with_vis)
            }
            Metric::FineFattening(p) => region::fine_fattening(p.thresh, algo, gt, eval_mask, with_vis),
            Metric::FineThinning(p) => region::fine_thinning(p.thresh, algo, gt, eval_mask, with_vis),
            Metric::BackgammonFattening(_) => {
                let fg = scene.fg_extrapolation(gt, resolution);
                stratified::backgammon_fattening(algo, gt, &fg, eval_mask, with_vis)
            }
            Metric::BackgammonThinning(_) => {
                let bg = scene.bg_extrapolation(gt);
                stratified::backgammon_thinning(algo, gt, &bg, eval_mask, with_vis)
            }
            // dots are scored per box and size class, not per pixel of the mask
            Metric::MissedDots(p) => stratified::missed_dots(p, algo, gt, scene, resolution, with_vis)?,
            Metric::Runtime { .. } => return Err(EvalError::NotPixelMetric { id: self.id() }),
        };
        Ok(out)
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Metric {}

impl Hash for Metric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_results_file_keys() {
        assert_eq!(Metric::bad_pix(0.07).id(), "badpix_0070");
        assert_eq!(Metric::mse().id(), "mse_100");
        assert_eq!(Metric::quantile(25).id(), "q_25_100");
        assert_eq!(
            Metric::BumpinessPlanes(BumpinessParams::default()).id(),
            "bumpiness_planes_100_0050"
        );
        assert_eq!(
            Metric::FineFattening(BadPixParams { thresh: -0.15 }).id(),
            "fine_fattening_0150"
        );
        assert_eq!(
            Metric::MissedDots(MissedDotsParams::default()).id(),
            "missed_dots_50_0400"
        );
    }

    #[test]
    fn names_and_formatting() {
        let m = Metric::bad_pix(0.07);
        assert_eq!(m.display_name(), "BadPix(0.07)");
        assert_eq!(m.short_name(), "BadPix");
        assert_eq!(m.format_score(12.345), "12.35%");
        assert_eq!(Metric::mse().format_score(1.0), "1.00");
        assert_eq!(
            Metric::BackgammonFattening(BadPixParams::default()).display_name(),
            "Backgammon: Fattening"
        );
        assert_eq!(
            Metric::DotsBackgroundMse(MseParams::default()).short_name(),
            "Background"
        );
        assert_eq!(Metric::runtime(true).short_name(), "Time (log10)");
    }

    #[test]
    fn equality_goes_through_id() {
        assert_eq!(Metric::bad_pix(0.07), Metric::bad_pix(0.0700001));
        assert_ne!(Metric::bad_pix(0.07), Metric::bad_pix(0.03));
        assert!(Metric::quantile(25).pixelize_results());
        assert!(!Metric::MaePlanes.pixelize_results());
    }

    #[test]
    fn runtime_is_not_a_pixel_metric() {
        let m = Metric::runtime(true);
        assert!((m.runtime_score(100.0).unwrap() - 2.0).abs() < 1e-12);
        assert!(Metric::mse().runtime_score(1.0).is_err());
    }
}
