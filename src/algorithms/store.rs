//! On-disk layout of algorithm submissions:
//!
//! ```text
//! <root>/<algorithm>/disp_maps/<scene>.pfm
//! <root>/<algorithm>/runtimes/<scene>.txt
//! ```
use crate::config::{DIR_NAME_DISP_MAPS, DIR_NAME_RUNTIMES};
use crate::error::EvalError;
use crate::image::{io, pfm, resample, ImageF32, Interpolation};
use crate::scene::catalog::list_dirs;
use crate::scene::{Resolution, Scene};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct AlgorithmStore {
    root: PathBuf,
}

impl AlgorithmStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn algo_dir(&self, algo_name: &str) -> PathBuf {
        self.root.join(algo_name)
    }

    /// Submission directories under the root, sorted by name.
    pub fn available_algo_names(&self) -> Result<Vec<String>, EvalError> {
        list_dirs(&self.root)
    }

    pub fn load_algo_result(
        &self,
        algo_name: &str,
        scene: &Scene,
        resolution: Resolution,
    ) -> Result<ImageF32, EvalError> {
        load_algo_result_from_dir(&self.algo_dir(algo_name), scene, resolution)
    }

    pub fn load_runtime(&self, algo_name: &str, scene: &Scene) -> Result<f64, EvalError> {
        io::read_runtime(&runtime_path(&self.algo_dir(algo_name), scene.name()))
    }

    pub fn save_algo_result(
        &self,
        algo_name: &str,
        scene: &Scene,
        result: &ImageF32,
    ) -> Result<(), EvalError> {
        let path = disp_map_path(&self.algo_dir(algo_name), scene.name());
        pfm::write_pfm(&path, result)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    pub fn save_runtime(&self, algo_name: &str, scene: &Scene, runtime: f64) -> Result<(), EvalError> {
        io::write_runtime(&runtime_path(&self.algo_dir(algo_name), scene.name()), runtime)
    }
}

pub fn disp_map_path(algo_dir: &Path, scene_name: &str) -> PathBuf {
    algo_dir
        .join(DIR_NAME_DISP_MAPS)
        .join(format!("{scene_name}.pfm"))
}

pub fn runtime_path(algo_dir: &Path, scene_name: &str) -> PathBuf {
    algo_dir
        .join(DIR_NAME_RUNTIMES)
        .join(format!("{scene_name}.txt"))
}

/// Load a submitted disparity map and zoom it (nearest neighbour) to the
/// scene grid at `resolution`.
pub fn load_algo_result_from_dir(
    algo_dir: &Path,
    scene: &Scene,
    resolution: Resolution,
) -> Result<ImageF32, EvalError> {
    let path = disp_map_path(algo_dir, scene.name());
    let mut result = pfm::read_pfm(&path)?;
    let scale = scene.scale(resolution);
    if scale != 1.0 {
        result = resample::zoom_f32(&result, scale, Interpolation::Nearest);
    }
    scene.check_shape(
        &format!("algorithm result {}", path.display()),
        result.shape(),
        resolution,
    )?;
    Ok(result)
}
