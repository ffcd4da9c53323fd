//! Raster rendering of disparity maps and metric visualizations.
//!
//! Colour maps are piecewise-linear approximations of the matplotlib
//! colour maps; values are clamped to the display range. Pixels without a
//! value are drawn in [`BACKGROUND`].
use crate::algorithms::{Algorithm, AlgorithmStore};
use crate::config::ToolkitConfig;
use crate::error::EvalError;
use crate::image::io::save_rgb_png;
use crate::image::resample::pixelize;
use crate::image::{ImageF32, ImageF64};
use crate::metrics::{Colormap, Metric, Visualization};
use crate::scene::{Resolution, Scene};
use image::{Rgb, RgbImage};
use log::{debug, warn};
use std::path::Path;

pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Disparity range factor applied to the scene's `disp_min`/`disp_max`.
const DISP_RANGE_FACTOR: f64 = 0.9;
/// Visualizations are coarsened to blocks of 1/10 of the image.
const PIXELIZE_FACTOR: f64 = 0.1;

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];
const SEISMIC: [[u8; 3]; 5] = [
    [0, 0, 77],
    [0, 0, 255],
    [255, 255, 255],
    [255, 0, 0],
    [128, 0, 0],
];
const RDYLGN_R: [[u8; 3]; 5] = [
    [0, 104, 55],
    [102, 189, 99],
    [255, 255, 191],
    [244, 109, 67],
    [165, 0, 38],
];
const YLORRD: [[u8; 3]; 5] = [
    [255, 255, 204],
    [254, 217, 118],
    [253, 141, 60],
    [227, 26, 28],
    [128, 0, 38],
];
const GRAY: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

impl Colormap {
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Seismic => &SEISMIC,
            Colormap::RdYlGnR => &RDYLGN_R,
            Colormap::YlOrRd => &YLORRD,
            Colormap::Gray => &GRAY,
        }
    }

    /// Colour for values below the range; `None` clamps to the first stop.
    pub fn under_color(self) -> Option<[u8; 3]> {
        match self {
            Colormap::YlOrRd => Some([128, 128, 128]),
            _ => None,
        }
    }

    /// Colour of `t` in `[0, 1]` (clamped).
    pub fn sample(self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let i0 = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i0 as f64;
        let (a, b) = (stops[i0], stops[i0 + 1]);
        std::array::from_fn(|c| (a[c] as f64 + (b[c] as f64 - a[c] as f64) * frac).round() as u8)
    }

    /// Colour of `value` in the range `[vmin, vmax]`; `None` for non-finite
    /// values.
    pub fn map(self, value: f64, vmin: f64, vmax: f64) -> Option<[u8; 3]> {
        if !value.is_finite() {
            return None;
        }
        if value < vmin {
            if let Some(under) = self.under_color() {
                return Some(under);
            }
        }
        let span = vmax - vmin;
        let t = if span > 0.0 { (value - vmin) / span } else { 0.0 };
        Some(self.sample(t))
    }
}

/// Render `values` with `cmap`, non-finite pixels as [`BACKGROUND`].
pub fn render_scalar(values: &ImageF64, vmin: f64, vmax: f64, cmap: Colormap) -> RgbImage {
    RgbImage::from_fn(values.w as u32, values.h as u32, |x, y| {
        let v = values.get(x as usize, y as usize);
        Rgb(cmap.map(v, vmin, vmax).unwrap_or(BACKGROUND))
    })
}

/// Disparity display range of `scene`.
pub fn disp_range(scene: &Scene) -> (f64, f64) {
    (
        scene.params.disp_min * DISP_RANGE_FACTOR,
        scene.params.disp_max * DISP_RANGE_FACTOR,
    )
}

/// Colour-coded disparity map.
pub fn disp_map_image(disp: &ImageF32, scene: &Scene, cmap: Colormap) -> RgbImage {
    let (vmin, vmax) = disp_range(scene);
    render_scalar(&disp.to_f64(), vmin, vmax, cmap)
}

/// Metric visualization drawn over a grey rendering of the estimate.
///
/// On scenes with hidden ground truth the visualization is pixelized for
/// metrics that would otherwise reveal it.
pub fn metric_overlay(
    algo: &ImageF32,
    vis: &Visualization,
    metric: &Metric,
    scene: &Scene,
    config: &ToolkitConfig,
) -> RgbImage {
    let mut canvas = disp_map_image(algo, scene, Colormap::Gray);
    let mut values = ImageF64::from_fn(vis.values.w, vis.values.h, |x, y| {
        vis.get(x, y).unwrap_or(f64::NAN)
    });
    if scene.hidden_gt() && metric.pixelize_results() && config.pixelize_hidden {
        values = pixelize(&values, PIXELIZE_FACTOR);
    }

    let hints = metric.plot_hints();
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        if x >= values.w || y >= values.h {
            continue;
        }
        if let Some(rgb) = hints.cmap.map(values.get(x, y), hints.cmin, hints.cmax) {
            *px = Rgb(rgb);
        }
    }
    canvas
}

/// Figure path relative to the evaluation output directory:
/// `<category>/<scene>_<descr>.<ext>`.
pub fn relative_fig_path(scene: &Scene, descr: &str, ext: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        scene.category().as_str(),
        scene.name(),
        descr,
        ext
    )
}

/// Surface normals of a disparity map, `(n + 1) / 2` per channel.
pub fn normals_image(disp: &ImageF32, scene: &Scene) -> RgbImage {
    scene.normal_vis(disp).to_rgb()
}

/// Ground-truth normals, from `gt_depth` when the scene has it and from the
/// ground-truth disparity otherwise.
pub fn gt_normals_image(scene: &Scene, resolution: Resolution) -> Result<RgbImage, EvalError> {
    match scene.depth_map(resolution) {
        Ok(depth) => Ok(scene.depth_normals(&depth.to_f64()).visualization().to_rgb()),
        Err(err) if err.is_not_found() => Ok(normals_image(&scene.gt(resolution)?, scene)),
        Err(err) => Err(err),
    }
}

/// Write the center view, the ground-truth normals and the normals of each
/// algorithm's submission for `scene` under `figures_dir`, named after
/// [`relative_fig_path`]. Missing inputs are skipped. Returns the number of
/// figures written.
pub fn save_scene_figures(
    scene: &Scene,
    store: &AlgorithmStore,
    algorithms: &[Algorithm],
    figures_dir: &Path,
) -> Result<usize, EvalError> {
    let res = Resolution::Low;
    let mut count = 0;
    let mut save = |figure: &RgbImage, descr: &str| -> Result<(), EvalError> {
        let path = figures_dir.join(relative_fig_path(scene, descr, "png"));
        debug!("Saving {}", path.display());
        save_rgb_png(figure, &path)?;
        count += 1;
        Ok(())
    };

    match scene.center_view(res) {
        Ok(view) => save(&view, "center_view")?,
        Err(err) if err.is_not_found() => {
            warn!("No center view for {}: {err}", scene.display_name())
        }
        Err(err) => return Err(err),
    }
    if !scene.hidden_gt() {
        save(&gt_normals_image(scene, res)?, "normals_gt")?;
    }
    for algorithm in algorithms {
        match store.load_algo_result(&algorithm.file_name, scene, res) {
            Ok(disp) => {
                let descr = format!("normals_{}", algorithm.file_name);
                save(&normals_image(&disp, scene), &descr)?;
            }
            Err(err) if err.is_not_found() => warn!(
                "Skipping normals of {} on {}: {err}",
                algorithm.display_name,
                scene.display_name()
            ),
            Err(err) => return Err(err),
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colormap_endpoints_and_clamping() {
        assert_eq!(Colormap::Gray.sample(0.0), [0, 0, 0]);
        assert_eq!(Colormap::Gray.sample(1.0), [255, 255, 255]);
        assert_eq!(Colormap::Gray.sample(0.5), [128, 128, 128]);
        assert_eq!(Colormap::Viridis.map(5.0, 0.0, 1.0), Some(VIRIDIS[4]));
        assert_eq!(Colormap::Viridis.map(-5.0, 0.0, 1.0), Some(VIRIDIS[0]));
        assert_eq!(Colormap::YlOrRd.map(-5.0, 0.0, 1.0), Some([128, 128, 128]));
        assert_eq!(Colormap::Seismic.map(f64::NAN, 0.0, 1.0), None);
    }

    #[test]
    fn nan_pixels_render_as_background() {
        let mut values = ImageF64::filled(2, 1, 0.0);
        values.set(1, 0, f64::NAN);
        let img = render_scalar(&values, 0.0, 1.0, Colormap::Gray);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, BACKGROUND);
    }
}
