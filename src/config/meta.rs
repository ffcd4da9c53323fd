use super::{load_json, ToolkitConfig};
use serde::Deserialize;
use std::path::Path;

/// Config of `compute_meta_algorithms`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetaToolConfig {
    pub toolkit: ToolkitConfig,
    /// `best`, `mean`, `median_diff`, `median_disp`; empty means all.
    pub meta_algorithms: Vec<String>,
    /// Input algorithms; empty means all submitted algorithms.
    pub algorithms: Vec<String>,
    pub scenes: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<MetaToolConfig, String> {
    load_json(path)
}
