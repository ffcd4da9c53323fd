use super::{load_json, ToolkitConfig};
use crate::evaluation::EvaluationOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of the `lf-bench` scoring run.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvaluationToolConfig {
    pub toolkit: ToolkitConfig,
    /// Algorithm directory names under `paths.algo_path`; empty means all.
    pub algorithms: Vec<String>,
    /// Scene or category names; empty means every available scene.
    pub scenes: Vec<String>,
    /// Metric keys, ids or group names; empty means all.
    pub metrics: Vec<String>,
    /// Meta-algorithms to compute before scoring and to score alongside the
    /// submitted algorithms.
    pub meta_algorithms: Vec<String>,
    pub options: EvaluationOptions,
    pub output: EvaluationOutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvaluationOutputConfig {
    /// Per-algorithm reports (success, messages, timing) as JSON.
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<EvaluationToolConfig, String> {
    load_json(path)
}
