use env_logger::Env;
use lf_bench::algorithms::{Algorithm, AlgorithmStore, MetaAlgorithm};
use lf_bench::analysis::{
    backgammon_fattening_thinning, bad_pix_series, default_thresholds, dots_per_box_mse,
    meta_algo_diff, pairwise_diff, pyramids_disp_vs_gt, FatteningThinningSeries, PyramidsSeries,
    Series,
};
use lf_bench::config::overview::{load_config, OverviewToolConfig};
use lf_bench::config::resolve::{resolve_algorithms, resolve_metrics, resolve_scenes};
use lf_bench::evaluation::visualize::{relative_fig_path, render_scalar, save_scene_figures};
use lf_bench::evaluation::{collect_scores, Average, ScoreTable};
use lf_bench::image::io::{save_rgb_png, write_json_file};
use lf_bench::metrics::{Colormap, Metric};
use lf_bench::scene::{Scene, StratifiedKind};
use serde::Serialize;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Display range of error-difference maps.
const DIFF_RANGE: f64 = 0.1;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let toolkit = &config.toolkit;

    let scenes = resolve_scenes(&config.scenes, toolkit)?;
    let metrics = resolve_metrics(&config.metrics, toolkit)?;
    let mut algorithms = resolve_algorithms(&config.algorithms, toolkit)?;
    if config.with_meta_algorithms {
        algorithms.extend(MetaAlgorithm::ALL.iter().map(|m| m.algorithm()));
    }
    let store = AlgorithmStore::new(&toolkit.paths.algo_path);

    let scene_names: Vec<&str> = scenes.iter().map(Scene::name).collect();
    let table = collect_scores(
        &toolkit.paths.algo_eval_path(),
        &algorithms,
        &scene_names,
        &metrics,
    )
    .map_err(|e| e.to_string())?;

    let overview = build_overview(&config, &store, &algorithms, &scenes, &metrics, &table)?;
    write_json_file(&config.output.overview_json, &overview).map_err(|e| e.to_string())?;
    println!("Overview written to {}", config.output.overview_json.display());

    if let Some(path) = &config.output.table_txt {
        let text = format_table(&algorithms, &metrics, &overview.averages);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        println!("Score table written to {}", path.display());
    }

    if !config.comparisons.is_empty() {
        let figures_dir = config
            .output
            .figures_dir
            .as_deref()
            .ok_or("output.figures_dir is required for comparisons")?;
        let count = render_comparisons(&config, &store, &scenes, figures_dir)?;
        println!("Saved {count} comparison figure(s) to {}", figures_dir.display());
    }

    if config.scene_figures {
        let figures_dir = config
            .output
            .figures_dir
            .as_deref()
            .ok_or("output.figures_dir is required for scene_figures")?;
        let subdir = figures_dir.join("scenes");
        let mut count = 0;
        for scene in &scenes {
            count += save_scene_figures(scene, &store, &algorithms, &subdir)
                .map_err(|e| e.to_string())?;
        }
        println!("Saved {count} scene figure(s) to {}", subdir.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: score_overview <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricAverages {
    id: String,
    display_name: String,
    /// One entry per algorithm, in the order of `algorithms`.
    values: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Overview<'a> {
    average: Average,
    scenes: Vec<&'a str>,
    algorithms: &'a [Algorithm],
    averages: Vec<MetricAverages>,
    table: &'a ScoreTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    bad_pix_series: Option<Vec<Series>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backgammon: Option<Vec<FatteningThinningSeries>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dots: Option<Vec<Series>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pyramids: Option<Vec<PyramidsSeries>>,
}

fn build_overview<'a>(
    config: &OverviewToolConfig,
    store: &AlgorithmStore,
    algorithms: &'a [Algorithm],
    scenes: &'a [Scene],
    metrics: &[Metric],
    table: &'a ScoreTable,
) -> Result<Overview<'a>, String> {
    let averages = metrics
        .iter()
        .enumerate()
        .map(|(idx, metric)| MetricAverages {
            id: metric.id(),
            display_name: metric.display_name(),
            values: table.average_over_scenes(idx, config.average),
        })
        .collect();

    // Analysis series need ground truth.
    let public: Vec<Scene> = scenes.iter().filter(|s| !s.hidden_gt()).cloned().collect();
    let find = |kind: StratifiedKind| public.iter().find(|s| s.stratified_kind() == Some(kind));

    let bad_pix_series = if config.series.bad_pix && !public.is_empty() {
        Some(
            bad_pix_series(
                store,
                algorithms,
                &public,
                &default_thresholds(),
                config.series.penalize_missing_pixels,
            )
            .map_err(|e| e.to_string())?,
        )
    } else {
        None
    };

    let (mut backgammon, mut dots, mut pyramids) = (None, None, None);
    if config.series.stratified {
        if let Some(scene) = find(StratifiedKind::Backgammon) {
            backgammon = Some(
                backgammon_fattening_thinning(
                    store,
                    algorithms,
                    scene,
                    config.series.backgammon_bins,
                )
                .map_err(|e| e.to_string())?,
            );
        }
        if let Some(scene) = find(StratifiedKind::Dots) {
            dots = Some(dots_per_box_mse(store, algorithms, scene).map_err(|e| e.to_string())?);
        }
        if let Some(scene) = find(StratifiedKind::Pyramids) {
            pyramids =
                Some(pyramids_disp_vs_gt(store, algorithms, scene).map_err(|e| e.to_string())?);
        }
    }

    Ok(Overview {
        average: config.average,
        scenes: scenes.iter().map(Scene::name).collect(),
        algorithms,
        averages,
        table,
        bad_pix_series,
        backgammon,
        dots,
        pyramids,
    })
}

fn format_table(algorithms: &[Algorithm], metrics: &[Metric], averages: &[MetricAverages]) -> String {
    let name_width = algorithms
        .iter()
        .map(|a| a.display_name.len())
        .max()
        .unwrap_or(0)
        .max("Algorithm".len());
    let mut out = format!("{:<name_width$}", "Algorithm");
    for metric in metrics {
        let _ = write!(out, " | {:>14}", metric.short_name());
    }
    out.push('\n');
    for (idx, algorithm) in algorithms.iter().enumerate() {
        let _ = write!(out, "{:<name_width$}", algorithm.display_name);
        for (metric, avg) in metrics.iter().zip(averages) {
            let cell = avg.values[idx];
            let cell = if cell.is_finite() {
                metric.format_score(cell)
            } else {
                "-".to_string()
            };
            let _ = write!(out, " | {cell:>14}");
        }
        out.push('\n');
    }
    out
}

fn render_comparisons(
    config: &OverviewToolConfig,
    store: &AlgorithmStore,
    scenes: &[Scene],
    figures_dir: &Path,
) -> Result<usize, String> {
    let mut count = 0;
    for comparison in &config.comparisons {
        let subdir = figures_dir
            .join("pairwise_diffs")
            .join(format!("{}_vs_{}", comparison.first, comparison.second));
        for scene in scenes.iter().filter(|s| !s.hidden_gt()) {
            let diff = match MetaAlgorithm::from_name(&comparison.first) {
                Some(meta) => meta_algo_diff(store, meta, &comparison.second, scene),
                None => pairwise_diff(store, &comparison.first, &comparison.second, scene),
            }
            .map_err(|e| e.to_string())?;
            let figure = render_scalar(&diff, -DIFF_RANGE, DIFF_RANGE, Colormap::Seismic);
            save_rgb_png(&figure, &subdir.join(relative_fig_path(scene, "diff", "png")))
                .map_err(|e| e.to_string())?;
            count += 1;
        }
    }
    Ok(count)
}
