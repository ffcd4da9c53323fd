//! Model of `results.json`: `scene -> {algorithm_result?, scores, ...}`.
//!
//! Non-finite scores are written as `null` and read back as NaN. Keys this
//! model does not know are kept in `extra` so merging into an existing file
//! never drops data.
use crate::error::EvalError;
use crate::image::io;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub const RESULTS_FILE_NAME: &str = "results.json";

/// Per-scene entries keyed by scene name.
pub type ResultsFile = BTreeMap<String, SceneResults>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm_result: Option<DispMapFigure>,
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreEntry>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SceneResults {
    /// Nothing scored, rendered or carried over for this scene.
    pub fn is_empty(&self) -> bool {
        self.algorithm_result.is_none() && self.scores.is_empty() && self.extra.is_empty()
    }
}

/// Rendered disparity map of a submission, paths relative to the output
/// directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispMapFigure {
    pub thumb: String,
    pub channels: u32,
    pub height: usize,
    pub width: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureRef {
    pub thumb: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(with = "nan_as_null")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<FigureRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ScoreEntry {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            visualization: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_visualization(value: f64, thumb: String) -> Self {
        Self {
            visualization: Some(FigureRef { thumb }),
            ..Self::new(value)
        }
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

/// Read a results file; a missing file is an empty result set.
pub fn load_results(path: &Path) -> Result<ResultsFile, EvalError> {
    match io::read_json_file(path) {
        Ok(results) => Ok(results),
        Err(err) if err.is_not_found() => Ok(ResultsFile::new()),
        Err(err) => Err(err),
    }
}

pub fn save_results(path: &Path, results: &ResultsFile) -> Result<(), EvalError> {
    io::write_json_file(path, results)
}

/// Score of `metric_id` on `scene`, NaN when absent.
pub fn score_value(results: &ResultsFile, scene: &str, metric_id: &str) -> f64 {
    results
        .get(scene)
        .and_then(|s| s.scores.get(metric_id))
        .map_or(f64::NAN, |entry| entry.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_scores_round_trip_through_null() {
        let mut scene = SceneResults::default();
        scene.scores.insert("mse_100".into(), ScoreEntry::new(f64::NAN));
        scene
            .scores
            .insert("badpix_0070".into(), ScoreEntry::with_visualization(12.5, "training/dino_badpix_0070.png".into()));
        let mut results = ResultsFile::new();
        results.insert("dino".into(), scene);

        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains(r#""mse_100":{"value":null}"#), "{json}");
        let back: ResultsFile = serde_json::from_str(&json).unwrap();
        assert!(score_value(&back, "dino", "mse_100").is_nan());
        assert_eq!(score_value(&back, "dino", "badpix_0070"), 12.5);
        assert!(score_value(&back, "cotton", "badpix_0070").is_nan());
    }

    #[test]
    fn unknown_keys_survive() {
        let json = r#"{"dino": {"scores": {"q_25_100": {"value": 1.5, "rank": 3}}, "note": "x"}}"#;
        let results: ResultsFile = serde_json::from_str(json).unwrap();
        let dino = &results["dino"];
        assert_eq!(dino.extra.get("note"), Some(&Value::from("x")));
        assert_eq!(dino.scores["q_25_100"].extra.get("rank"), Some(&Value::from(3)));
        let again = serde_json::to_value(&results).unwrap();
        assert_eq!(again["dino"]["note"], Value::from("x"));
    }
}
