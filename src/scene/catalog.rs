//! Built-in scene lists and on-disk scene discovery.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::EvalError;

pub const TEST_SCENES: [&str; 4] = ["bedroom", "bicycle", "herbs", "origami"];
pub const TRAINING_SCENES: [&str; 4] = ["boxes", "cotton", "dino", "sideboard"];
pub const STRATIFIED_SCENES: [&str; 4] = ["backgammon", "dots", "pyramids", "stripes"];
pub const ADDITIONAL_SCENES: [&str; 16] = [
    "antinous",
    "boardgames",
    "dishes",
    "greek",
    "kitchen",
    "medieval2",
    "museum",
    "pens",
    "pillows",
    "platonic",
    "rosemary",
    "table",
    "tomb",
    "tower",
    "town",
    "vinyl",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneCategory {
    Stratified,
    Training,
    Test,
    Additional,
    Other,
}

impl SceneCategory {
    pub const ALL: [SceneCategory; 5] = [
        SceneCategory::Stratified,
        SceneCategory::Training,
        SceneCategory::Test,
        SceneCategory::Additional,
        SceneCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SceneCategory::Stratified => "stratified",
            SceneCategory::Training => "training",
            SceneCategory::Test => "test",
            SceneCategory::Additional => "additional",
            SceneCategory::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Built-in scene names of this category (empty for `Other`).
    pub fn scene_names(self) -> &'static [&'static str] {
        match self {
            SceneCategory::Stratified => &STRATIFIED_SCENES,
            SceneCategory::Training => &TRAINING_SCENES,
            SceneCategory::Test => &TEST_SCENES,
            SceneCategory::Additional => &ADDITIONAL_SCENES,
            SceneCategory::Other => &[],
        }
    }
}

impl fmt::Display for SceneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a scene name; unlisted names are `Other`.
pub fn infer_category(scene_name: &str) -> SceneCategory {
    [
        SceneCategory::Stratified,
        SceneCategory::Training,
        SceneCategory::Test,
        SceneCategory::Additional,
    ]
    .into_iter()
    .find(|c| c.scene_names().contains(&scene_name))
    .unwrap_or(SceneCategory::Other)
}

/// Scenes of the public benchmark: stratified, then training, then test.
pub fn benchmark_scene_names() -> Vec<&'static str> {
    STRATIFIED_SCENES
        .iter()
        .chain(TRAINING_SCENES.iter())
        .chain(TEST_SCENES.iter())
        .copied()
        .collect()
}

/// Scenes present under `data_root`, grouped by category directory.
///
/// A scene directory counts as available once it holds a `parameters.cfg`.
/// With `categories == None` every subdirectory of `data_root` whose name is
/// a known category is scanned.
pub fn available_scenes_by_category(
    data_root: &Path,
    categories: Option<&[SceneCategory]>,
) -> Result<BTreeMap<SceneCategory, Vec<String>>, EvalError> {
    let categories: Vec<SceneCategory> = match categories {
        Some(c) => c.to_vec(),
        None => list_dirs(data_root)?
            .iter()
            .filter_map(|d| SceneCategory::from_name(d))
            .collect(),
    };

    let mut out = BTreeMap::new();
    for category in categories {
        let category_dir = data_root.join(category.as_str());
        let mut names: Vec<String> = list_dirs(&category_dir)?
            .into_iter()
            .filter(|d| category_dir.join(d).join("parameters.cfg").is_file())
            .collect();
        names.sort();
        out.insert(category, names);
    }
    Ok(out)
}

pub(crate) fn list_dirs(root: &Path) -> Result<Vec<String>, EvalError> {
    let entries = fs::read_dir(root).map_err(|e| EvalError::io(root, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EvalError::io(root, e))?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_inferred_from_name_lists() {
        assert_eq!(infer_category("dots"), SceneCategory::Stratified);
        assert_eq!(infer_category("cotton"), SceneCategory::Training);
        assert_eq!(infer_category("herbs"), SceneCategory::Test);
        assert_eq!(infer_category("vinyl"), SceneCategory::Additional);
        assert_eq!(infer_category("my_scene"), SceneCategory::Other);
    }

    #[test]
    fn benchmark_has_twelve_scenes_in_order() {
        let names = benchmark_scene_names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "backgammon");
        assert_eq!(names[4], "boxes");
        assert_eq!(names[11], "origami");
    }

    #[test]
    fn discovery_requires_parameter_file() {
        let dir = tempfile::tempdir().unwrap();
        let with_cfg = dir.path().join("training/boxes");
        let without_cfg = dir.path().join("training/cotton");
        fs::create_dir_all(&with_cfg).unwrap();
        fs::create_dir_all(&without_cfg).unwrap();
        fs::write(with_cfg.join("parameters.cfg"), "").unwrap();
        fs::create_dir_all(dir.path().join("misc")).unwrap();

        let found = available_scenes_by_category(dir.path(), None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&SceneCategory::Training], vec!["boxes".to_string()]);
    }
}
