//! Scene data, submissions and toolkit config in a temporary directory.
#![allow(dead_code)]

use image::GrayImage;
use lf_bench::config::{ToolkitConfig, DIR_NAME_DISP_MAPS, DIR_NAME_RUNTIMES};
use lf_bench::image::io::write_runtime;
use lf_bench::image::pfm::write_pfm;
use lf_bench::image::resample::zoom_f32;
use lf_bench::image::{ImageF32, Interpolation};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const WIDTH: usize = 16;
pub const HEIGHT: usize = 12;
pub const HIGH_RES_SCALE: f64 = 2.0;
pub const BOUNDARY_OFFSET: usize = 2;

pub struct Workspace {
    pub dir: TempDir,
    pub config: ToolkitConfig,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path();
        let mut config = ToolkitConfig {
            high_res_scale: HIGH_RES_SCALE,
            boundary_offset: BOUNDARY_OFFSET,
            submission_width: WIDTH,
            submission_height: HEIGHT,
            ..Default::default()
        };
        config.paths.data_path = root.join("data");
        config.paths.algo_path = root.join("algo_results");
        config.paths.eval_path = root.join("evaluation");
        fs::create_dir_all(&config.paths.data_path).expect("create data dir");
        fs::create_dir_all(&config.paths.algo_path).expect("create algo dir");
        Self { dir, config }
    }

    pub fn scene_dir(&self, category: &str, name: &str) -> PathBuf {
        self.config.paths.data_path.join(category).join(name)
    }

    /// Write `parameters.cfg` and ground truth at both resolutions. The
    /// high-res file is the order-0 zoom of `gt`.
    pub fn add_scene(&self, category: &str, name: &str, gt: &ImageF32) -> PathBuf {
        let dir = self.scene_dir(category, name);
        fs::create_dir_all(&dir).expect("create scene dir");
        fs::write(dir.join("parameters.cfg"), parameters_cfg(gt.w, gt.h)).expect("write cfg");
        write_pfm(&dir.join("gt_disp_lowres.pfm"), gt).expect("write low-res gt");
        let high = zoom_f32(gt, HIGH_RES_SCALE, Interpolation::Nearest);
        write_pfm(&dir.join("gt_disp_highres.pfm"), &high).expect("write high-res gt");
        dir
    }

    /// Scene directory with parameters but no ground truth (hidden GT).
    pub fn add_scene_without_gt(&self, category: &str, name: &str) -> PathBuf {
        let dir = self.scene_dir(category, name);
        fs::create_dir_all(&dir).expect("create scene dir");
        fs::write(dir.join("parameters.cfg"), parameters_cfg(WIDTH, HEIGHT)).expect("write cfg");
        dir
    }

    /// Write a binary region as PNG (non-zero pixels belong to it).
    pub fn add_mask(&self, category: &str, name: &str, file: &str, f: impl Fn(u32, u32) -> bool) {
        let (w, h) = if file.ends_with("_highres.png") {
            (WIDTH as f64 * HIGH_RES_SCALE, HEIGHT as f64 * HIGH_RES_SCALE)
        } else {
            (WIDTH as f64, HEIGHT as f64)
        };
        let img = GrayImage::from_fn(w as u32, h as u32, |x, y| {
            image::Luma([if f(x, y) { 255 } else { 0 }])
        });
        img.save(self.scene_dir(category, name).join(file))
            .expect("write mask");
    }

    pub fn algo_dir(&self, algo: &str) -> PathBuf {
        self.config.paths.algo_dir(algo)
    }

    pub fn add_submission(&self, algo: &str, scene: &str, disp: &ImageF32, runtime: f64) {
        let dir = self.algo_dir(algo);
        write_pfm(&dir.join(DIR_NAME_DISP_MAPS).join(format!("{scene}.pfm")), disp)
            .expect("write disp map");
        write_runtime(&dir.join(DIR_NAME_RUNTIMES).join(format!("{scene}.txt")), runtime)
            .expect("write runtime");
    }
}

pub fn parameters_cfg(width: usize, height: usize) -> String {
    format!(
        "[intrinsics]\n\
         image_resolution_x_px = {width}\n\
         image_resolution_y_px = {height}\n\
         focal_length_mm = 100\n\
         sensor_size_mm = 35\n\
         \n\
         [extrinsics]\n\
         num_cams_x = 9\n\
         num_cams_y = 9\n\
         baseline_mm = 90\n\
         focus_distance_m = 8\n\
         \n\
         [meta]\n\
         disp_min = -1.5\n\
         disp_max = 1.5\n\
         depth_map_scale = {HIGH_RES_SCALE}\n"
    )
}

/// Horizontal disparity ramp from -1 to 1.
pub fn ramp(width: usize, height: usize) -> ImageF32 {
    ImageF32::from_fn(width, height, |x, _| {
        -1.0 + 2.0 * x as f32 / (width - 1) as f32
    })
}

/// `gt` plus `offset` on every pixel with `x < split`.
pub fn with_offset_left(gt: &ImageF32, split: usize, offset: f32) -> ImageF32 {
    ImageF32::from_fn(gt.w, gt.h, |x, y| {
        let v = gt.get(x, y);
        if x < split {
            v + offset
        } else {
            v
        }
    })
}

pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
