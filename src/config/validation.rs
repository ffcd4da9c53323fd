use super::{load_json, ToolkitConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of `validate_submission`.
#[derive(Debug, Deserialize)]
pub struct ValidationToolConfig {
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    /// Extracted submission holding `disp_maps/` and `runtimes/`.
    pub submission: PathBuf,
    /// Scene names to expect; empty means the benchmark scenes.
    #[serde(default)]
    pub scenes: Vec<String>,
    /// Optional JSON copy of the validation report.
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<ValidationToolConfig, String> {
    load_json(path)
}
