use super::{load_json, ToolkitConfig};
use crate::evaluation::Average;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of `score_overview`: aggregate previously written results and
/// compute the supplementary analysis series.
#[derive(Debug, Deserialize)]
pub struct OverviewToolConfig {
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    #[serde(default)]
    pub algorithms: Vec<String>,
    /// Add the meta-algorithms (computed beforehand) to the overview.
    #[serde(default)]
    pub with_meta_algorithms: bool,
    #[serde(default)]
    pub scenes: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub average: Average,
    #[serde(default)]
    pub series: SeriesConfig,
    /// Error-difference maps `|first−gt| − |second−gt|` per scene. `first`
    /// may name a meta-algorithm file (`per_pix_best`, ...).
    #[serde(default)]
    pub comparisons: Vec<PairwiseComparison>,
    /// Center view and surface normals (ground truth and per algorithm) of
    /// every selected scene.
    #[serde(default)]
    pub scene_figures: bool,
    pub output: OverviewOutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PairwiseComparison {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// BadPix-vs-threshold curves over the selected scenes.
    pub bad_pix: bool,
    /// Count invalid pixels as bad at every threshold.
    pub penalize_missing_pixels: bool,
    /// Per-scene breakdowns of Backgammon, Dots and Pyramids when selected.
    pub stratified: bool,
    /// Vertical bins of the Backgammon breakdown.
    pub backgammon_bins: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            bad_pix: true,
            penalize_missing_pixels: false,
            stratified: true,
            backgammon_bins: 15,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OverviewOutputConfig {
    pub overview_json: PathBuf,
    /// Plain-text score table.
    #[serde(default)]
    pub table_txt: Option<PathBuf>,
    /// Root of rendered figures; required with `comparisons` or
    /// `scene_figures`.
    #[serde(default)]
    pub figures_dir: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<OverviewToolConfig, String> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_section_is_required() {
        assert!(serde_json::from_str::<OverviewToolConfig>("{}").is_err());
        let cfg: OverviewToolConfig = serde_json::from_str(
            r#"{"average": "mean", "output": {"overview_json": "out/overview.json"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.average, Average::Mean);
        assert!(cfg.series.bad_pix);
        assert_eq!(cfg.series.backgammon_bins, 15);
        assert!(cfg.output.table_txt.is_none());
        assert!(cfg.comparisons.is_empty());
        assert!(!cfg.scene_figures);
    }

    #[test]
    fn comparisons_name_both_sides() {
        let cfg: OverviewToolConfig = serde_json::from_str(
            r#"{
                "comparisons": [{"first": "per_pix_best", "second": "epi1"}],
                "output": {"overview_json": "o.json", "figures_dir": "figs"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.comparisons[0].first, "per_pix_best");
        assert_eq!(cfg.output.figures_dir, Some(PathBuf::from("figs")));
    }
}
