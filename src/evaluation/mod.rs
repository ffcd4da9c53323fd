//! Scoring pipeline: evaluate one submission on a set of scenes and persist
//! the scores (and optionally rendered figures) into `results.json`.
//!
//! Per scene, applicable metrics are grouped by the resolution they need;
//! each group reads ground truth and the submission once at that resolution.
//! Missing or malformed files abort only the current scene and are reported
//! in [`EvaluationReport::messages`]. Anything else stops the run and is
//! returned as `Err` after the scores gathered so far have been saved.
pub mod aggregate;
pub mod results;
pub mod validation;
pub mod visualize;

pub use aggregate::{collect_scores, Average, ScoreTable};
pub use results::{ResultsFile, SceneResults, ScoreEntry};
pub use validation::{validate_extracted_submission, ValidationReport};

use crate::algorithms::store::{disp_map_path, load_algo_result_from_dir, runtime_path};
use crate::config::ToolkitConfig;
use crate::diagnostics::TimingBreakdown;
use crate::error::EvalError;
use crate::image::io;
use crate::metrics::{Colormap, Metric};
use crate::scene::{Resolution, Scene};
use log::{error, info};
use results::{load_results, save_results, DispMapFigure, RESULTS_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use visualize::{disp_map_image, metric_overlay, relative_fig_path};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Render the disparity map and one figure per metric.
    pub visualize: bool,
    /// Merge into an existing `results.json` instead of replacing it.
    pub add_to_existing_results: bool,
    /// Copy the raw PFM next to the thumbnail (non-test scenes only).
    pub add_pfms_to_result: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            visualize: false,
            add_to_existing_results: true,
            add_pfms_to_result: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    /// True iff no scene failed.
    pub success: bool,
    pub messages: Vec<String>,
    pub timing: TimingBreakdown,
}

/// Score the submission in `algo_dir` and write `<output_dir>/results.json`.
///
/// The results file is written even when scenes failed.
pub fn evaluate(
    config: &ToolkitConfig,
    output_dir: &Path,
    algo_dir: &Path,
    scenes: &[Scene],
    metrics: &[Metric],
    options: &EvaluationOptions,
) -> Result<EvaluationReport, EvalError> {
    let run_start = Instant::now();
    info!("Evaluating algorithm results in: {}", algo_dir.display());
    info!("Writing results to: {}", output_dir.display());
    info!(
        "Using ground truth data from: {}",
        config.paths.data_path.display()
    );
    info!(
        "Metrics: {}",
        metrics.iter().map(Metric::display_name).collect::<Vec<_>>().join(", ")
    );
    info!(
        "Scenes: {}",
        scenes.iter().map(Scene::display_name).collect::<Vec<_>>().join(", ")
    );

    let results_path = output_dir.join(RESULTS_FILE_NAME);
    let mut results = if options.add_to_existing_results {
        load_results(&results_path)?
    } else {
        ResultsFile::new()
    };

    let mut messages = Vec::new();
    let mut timing = TimingBreakdown::default();
    let mut fatal = None;
    for scene in scenes {
        let scene_start = Instant::now();
        let existed = results.contains_key(scene.name());
        let mut scene_data = results.remove(scene.name()).unwrap_or_default();

        let outcome =
            evaluate_scene(config, output_dir, algo_dir, scene, metrics, options, &mut scene_data);
        timing.record(scene.name(), scene_start, outcome.is_err());
        // Scores computed before a failure are kept.
        if outcome.is_ok() || existed || !scene_data.is_empty() {
            results.insert(scene.name().to_string(), scene_data);
        }
        match outcome {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => {
                error!("{err}");
                messages.push(err.to_string());
            }
            Err(err) => {
                error!("Aborting evaluation on {}: {err}", scene.display_name());
                fatal = Some(err);
                break;
            }
        }
    }

    save_results(&results_path, &results)?;
    if let Some(err) = fatal {
        return Err(err);
    }
    info!("Done!");

    timing.finish(run_start);
    Ok(EvaluationReport {
        success: messages.is_empty(),
        messages,
        timing,
    })
}

fn evaluate_scene(
    config: &ToolkitConfig,
    output_dir: &Path,
    algo_dir: &Path,
    scene: &Scene,
    metrics: &[Metric],
    options: &EvaluationOptions,
    scene_data: &mut SceneResults,
) -> Result<(), EvalError> {
    if options.visualize {
        info!("Visualizing algorithm result on {}", scene.display_name());
        scene_data.algorithm_result = Some(visualize_algo_result(
            scene,
            algo_dir,
            output_dir,
            options.add_pfms_to_result,
        )?);
    }

    info!("Processing scene: {}", scene.display_name());
    info!("Using data from: {}", scene.data_path().display());
    if !options.add_to_existing_results {
        scene_data.scores.clear();
    }
    compute_scores(
        config,
        scene,
        metrics,
        algo_dir,
        output_dir,
        options.visualize,
        &mut scene_data.scores,
    )
}

/// Score all applicable metrics on `scene` into `scores`, keyed by metric id.
///
/// Scores are inserted as they are computed, so on `Err` the map holds every
/// metric scored before the failure.
pub fn compute_scores(
    config: &ToolkitConfig,
    scene: &Scene,
    metrics: &[Metric],
    algo_dir: &Path,
    output_dir: &Path,
    visualize: bool,
    scores: &mut BTreeMap<String, ScoreEntry>,
) -> Result<(), EvalError> {
    for resolution in [Resolution::Low, Resolution::High] {
        let batch: Vec<&Metric> = metrics
            .iter()
            .filter(|m| m.is_applicable(scene) && m.resolution(scene) == resolution)
            .collect();
        if batch.is_empty() {
            continue;
        }
        let gt = scene.gt(resolution)?;
        let algo = load_algo_result_from_dir(algo_dir, scene, resolution)?;

        for metric in batch {
            let entry = if visualize {
                let (score, vis) = metric.score_with_visualization(&algo, &gt, scene, resolution)?;
                let relative = relative_fig_path(scene, &metric.id(), "png");
                let figure = metric_overlay(&algo, &vis, metric, scene, config);
                io::save_rgb_png(&figure, &output_dir.join(&relative))?;
                ScoreEntry::with_visualization(score, relative)
            } else {
                ScoreEntry::new(metric.score(&algo, &gt, scene, resolution)?)
            };
            log_score(entry.value, metric, scene, resolution);
            scores.insert(metric.id(), entry);
        }
    }

    for metric in metrics.iter().filter(|m| m.is_runtime()) {
        let runtime = io::read_runtime(&runtime_path(algo_dir, scene.name()))?;
        let score = metric.runtime_score(runtime)?;
        log_score(score, metric, scene, metric.resolution(scene));
        scores.insert(metric.id(), ScoreEntry::new(score));
    }

    Ok(())
}

fn log_score(score: f64, metric: &Metric, scene: &Scene, resolution: Resolution) {
    info!(
        "Score {:5.2} for: {}, {}, Scale: {:.2}",
        score,
        metric.display_name(),
        scene.display_name(),
        scene.scale(resolution)
    );
}

/// Render the low-resolution submission and, for scenes with public ground
/// truth, copy the raw PFM next to it.
fn visualize_algo_result(
    scene: &Scene,
    algo_dir: &Path,
    output_dir: &Path,
    add_pfm: bool,
) -> Result<DispMapFigure, EvalError> {
    let algo = load_algo_result_from_dir(algo_dir, scene, Resolution::Low)?;
    let thumb = relative_fig_path(scene, "dispmap", "png");
    io::save_rgb_png(
        &disp_map_image(&algo, scene, Colormap::Viridis),
        &output_dir.join(&thumb),
    )?;

    let mut figure = DispMapFigure {
        thumb,
        channels: 3,
        height: algo.h,
        width: algo.w,
        raw: None,
    };

    if add_pfm && !scene.is_test() {
        let raw = relative_fig_path(scene, "dispmap", "pfm");
        let src = disp_map_path(algo_dir, scene.name());
        let dst = output_dir.join(&raw);
        info!("Copying disp map file from {} to {}", src.display(), dst.display());
        io::ensure_parent_dir(&dst)?;
        fs::copy(&src, &dst).map_err(|e| EvalError::io(&src, e))?;
        figure.raw = Some(raw);
    }
    Ok(figure)
}
