//! Turning the name lists of tool configs into scenes, metrics and
//! algorithms.
//!
//! An empty list selects the default (everything available). Unknown names
//! are fatal and reported with the available options.
use super::ToolkitConfig;
use crate::algorithms::{
    initialize_algorithms, load_meta_data, set_colors, Algorithm, AlgorithmFlags, AlgorithmStore,
    MetaAlgorithm,
};
use crate::metrics::{all_metrics, metric_group, Metric, METRIC_GROUP_NAMES};
use crate::scene::catalog::available_scenes_by_category;
use crate::scene::{Scene, SceneCategory};
use log::info;
use std::collections::{BTreeMap, HashSet};

/// Scenes named in `names`; each entry is a scene name or a category name
/// (all available scenes of that category). Empty selects every available
/// scene.
pub fn resolve_scenes<S: AsRef<str>>(
    names: &[S],
    config: &ToolkitConfig,
) -> Result<Vec<Scene>, String> {
    let available = available_scenes_by_category(&config.paths.data_path, None)
        .map_err(|e| format!("Failed to list scenes: {e}"))?;

    let all_names: Vec<&str> = available.values().flatten().map(String::as_str).collect();
    let unique: HashSet<&str> = all_names.iter().copied().collect();
    if unique.len() < all_names.len() {
        return Err(format!(
            "Scene names must be unique across all categories. Found {} duplicate(s).",
            all_names.len() - unique.len()
        ));
    }

    let mut selected: BTreeMap<SceneCategory, Vec<String>> = BTreeMap::new();
    if names.is_empty() {
        selected = available.clone();
    } else {
        for value in names {
            let value = value.as_ref();
            if let Some((category, _)) = available
                .iter()
                .find(|(_, scenes)| scenes.iter().any(|s| s == value))
            {
                selected.entry(*category).or_default().push(value.to_string());
            } else if let Some(scenes) =
                SceneCategory::from_name(value).and_then(|c| available.get(&c).map(|s| (c, s)))
            {
                selected.entry(scenes.0).or_default().extend(scenes.1.iter().cloned());
            } else {
                return Err(format!(
                    "Could not find scene for: {value}.\n  Available scenes are: {}.\n  \
                     Available categories are: {}.",
                    all_names.join(", "),
                    available.keys().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
                ));
            }
        }
    }

    let mut scenes = Vec::new();
    for (category, scene_names) in selected {
        for name in scene_names {
            let scene = Scene::load_with_category(&name, category, config)
                .map_err(|e| format!("Failed to load scene {name}: {e}"))?;
            scenes.push(scene);
        }
    }
    info!(
        "Scenes: {}",
        scenes.iter().map(Scene::name).collect::<Vec<_>>().join(", ")
    );
    Ok(scenes)
}

/// Lookup key of a metric: lower-cased display name, spaces as `_`, with
/// `( ) . :` removed (`BadPix(0.07)` -> `badpix007`).
pub fn metric_key(metric: &Metric) -> String {
    metric
        .display_name()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '.' | ':'))
        .collect()
}

/// Metrics named in `names`: group names, metric keys (see [`metric_key`])
/// or metric ids. Empty selects all metrics. Duplicates keep their first
/// position.
pub fn resolve_metrics<S: AsRef<str>>(
    names: &[S],
    config: &ToolkitConfig,
) -> Result<Vec<Metric>, String> {
    if names.is_empty() {
        return Ok(all_metrics(config));
    }

    let catalog = all_metrics(config);
    let mut metrics: Vec<Metric> = Vec::new();
    for value in names {
        let value = value.as_ref();
        let found = metric_group(value, config).or_else(|| {
            catalog
                .iter()
                .find(|m| metric_key(m) == value || m.id() == value)
                .map(|m| vec![m.clone()])
        });
        let Some(found) = found else {
            let mut keys: Vec<String> = catalog.iter().map(metric_key).collect();
            keys.sort();
            return Err(format!(
                "Could not find metric for: {value}.\n  Available metrics are: {}.\n  \
                 Available metric sets are: {}.",
                keys.join(", "),
                METRIC_GROUP_NAMES.join(", ")
            ));
        };
        for metric in found {
            if !metrics.contains(&metric) {
                metrics.push(metric);
            }
        }
    }
    Ok(metrics)
}

/// Submitted algorithms named in `names`, with acronyms from the metadata
/// file and palette colours. Meta-algorithm directories are never selected
/// by default and cannot be named here. Empty selects every available
/// algorithm.
pub fn resolve_algorithms<S: AsRef<str>>(
    names: &[S],
    config: &ToolkitConfig,
) -> Result<Vec<Algorithm>, String> {
    let store = AlgorithmStore::new(&config.paths.algo_path);
    let ignore: Vec<&str> = MetaAlgorithm::ALL.iter().map(|m| m.file_name()).collect();
    let available: Vec<String> = store
        .available_algo_names()
        .map_err(|e| format!("Failed to list algorithms: {e}"))?
        .into_iter()
        .filter(|a| !ignore.contains(&a.as_str()))
        .collect();

    let algo_names: Vec<String> = if names.is_empty() {
        available
    } else {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !available.iter().any(|a| a == name) {
                return Err(format!(
                    "Could not find algorithm for: {name}.\n  Available options are: {}.",
                    available.join(", ")
                ));
            }
            selected.push(name.to_string());
        }
        selected
    };

    let meta_data = load_meta_data(&config.paths.meta_data_path())
        .map_err(|e| format!("Failed to read algorithm meta data: {e}"))?;
    let mut algorithms = initialize_algorithms(&algo_names, &meta_data, AlgorithmFlags::default());
    set_colors(&mut algorithms, config, 0);
    Ok(algorithms)
}

/// Meta-algorithms by short name (`best`, `mean`, `median_diff`,
/// `median_disp`) or full file name. Empty selects all four.
pub fn resolve_meta_algorithms<S: AsRef<str>>(names: &[S]) -> Result<Vec<MetaAlgorithm>, String> {
    if names.is_empty() {
        return Ok(MetaAlgorithm::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            MetaAlgorithm::ALL
                .into_iter()
                .find(|m| m.file_name() == name || m.file_name().strip_prefix("per_pix_") == Some(name))
                .ok_or_else(|| {
                    format!(
                        "Could not find algorithm for: {name}.\n  Available options are: {}.",
                        MetaAlgorithm::ALL
                            .iter()
                            .filter_map(|m| m.file_name().strip_prefix("per_pix_"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })
        })
        .collect()
}
