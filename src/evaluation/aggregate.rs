//! Scene × metric × algorithm score tables read back from per-algorithm
//! `results.json` files, and averages over scenes.
//!
//! Missing and non-finite scores are masked (`None`) and never enter an
//! average.
use super::results::{load_results, score_value, RESULTS_FILE_NAME};
use crate::algorithms::Algorithm;
use crate::error::EvalError;
use crate::metrics::stats::{mean, median};
use crate::metrics::Metric;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Average {
    #[default]
    Median,
    Mean,
}

impl Average {
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Average::Median => median(values),
            Average::Mean => mean(values),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTable {
    pub scenes: Vec<String>,
    pub metrics: Vec<String>,
    pub algorithms: Vec<String>,
    /// Row-major `[scene][metric][algorithm]`.
    values: Vec<Option<f64>>,
}

impl ScoreTable {
    pub fn new(scenes: Vec<String>, metrics: Vec<String>, algorithms: Vec<String>) -> Self {
        let n = scenes.len() * metrics.len() * algorithms.len();
        Self {
            scenes,
            metrics,
            algorithms,
            values: vec![None; n],
        }
    }

    fn idx(&self, scene: usize, metric: usize, algo: usize) -> usize {
        (scene * self.metrics.len() + metric) * self.algorithms.len() + algo
    }

    pub fn get(&self, scene: usize, metric: usize, algo: usize) -> Option<f64> {
        self.values[self.idx(scene, metric, algo)]
    }

    /// Store a score; non-finite values are masked.
    pub fn set(&mut self, scene: usize, metric: usize, algo: usize, value: f64) {
        let idx = self.idx(scene, metric, algo);
        self.values[idx] = value.is_finite().then_some(value);
    }

    pub fn metric_index(&self, metric_id: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric_id)
    }

    /// Per-algorithm average of metric `metric` over all scenes; NaN for an
    /// algorithm without any valid score.
    pub fn average_over_scenes(&self, metric: usize, average: Average) -> Vec<f64> {
        (0..self.algorithms.len())
            .map(|a| {
                let valid: Vec<f64> = (0..self.scenes.len())
                    .filter_map(|s| self.get(s, metric, a))
                    .collect();
                average.apply(&valid)
            })
            .collect()
    }
}

/// Read `<algo_eval_path>/<algorithm>/results.json` for every algorithm.
///
/// A missing results file is an error; a scene or metric absent from an
/// existing file leaves the entry masked.
pub fn collect_scores<S: AsRef<str>>(
    algo_eval_path: &Path,
    algorithms: &[Algorithm],
    scene_names: &[S],
    metrics: &[Metric],
) -> Result<ScoreTable, EvalError> {
    let metric_ids: Vec<String> = metrics.iter().map(Metric::id).collect();
    let mut table = ScoreTable::new(
        scene_names.iter().map(|s| s.as_ref().to_string()).collect(),
        metric_ids.clone(),
        algorithms.iter().map(|a| a.file_name.clone()).collect(),
    );

    for (idx_a, algorithm) in algorithms.iter().enumerate() {
        let path = algo_eval_path.join(algorithm.name()).join(RESULTS_FILE_NAME);
        if !path.is_file() {
            return Err(EvalError::DataNotFound { path });
        }
        let results = load_results(&path)?;
        for (idx_s, scene) in scene_names.iter().enumerate() {
            if !results.contains_key(scene.as_ref()) {
                warn!("No scores for scene {} in {}", scene.as_ref(), path.display());
                continue;
            }
            for (idx_m, metric_id) in metric_ids.iter().enumerate() {
                let value = score_value(&results, scene.as_ref(), metric_id);
                table.set(idx_s, idx_m, idx_a, value);
            }
        }
    }
    Ok(table)
}
