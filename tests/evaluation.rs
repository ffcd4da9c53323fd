mod common;

use common::synthetic_scene::{approx_eq, ramp, with_offset_left, Workspace, HEIGHT, WIDTH};
use lf_bench::config::resolve::{resolve_metrics, resolve_scenes};
use lf_bench::error::EvalError;
use lf_bench::evaluation::results::{load_results, score_value, RESULTS_FILE_NAME};
use lf_bench::evaluation::{evaluate, EvaluationOptions};
use lf_bench::metrics::{BadPixParams, BumpinessParams, Metric};
use lf_bench::scene::Scene;
use std::fs;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn general_and_runtime() -> Vec<Metric> {
    vec![
        Metric::mse(),
        Metric::bad_pix(0.07),
        Metric::quantile(25),
        Metric::runtime(true),
        Metric::runtime(false),
    ]
}

/// `dino` with a submission that is 0.5 off on the three leftmost
/// evaluated columns (columns 2..5 of 2..14).
fn dino_workspace() -> Workspace {
    let ws = Workspace::new();
    let gt = ramp(WIDTH, HEIGHT);
    ws.add_scene("training", "dino", &gt);
    ws.add_submission("epi1", "dino", &with_offset_left(&gt, 5, 0.5), 2.5);
    ws
}

#[test]
fn general_metrics_and_runtimes_are_scored() {
    init_logger();
    let ws = dino_workspace();
    let scene = Scene::load("dino", &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");

    let report = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &[scene],
        &general_and_runtime(),
        &EvaluationOptions::default(),
    )
    .unwrap();
    assert!(report.success, "{:?}", report.messages);
    assert_eq!(report.timing.stages.len(), 1);

    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    let score = |id: &str| score_value(&results, "dino", id);
    assert!(approx_eq(score("badpix_0070"), 25.0, 1e-6), "{}", score("badpix_0070"));
    assert!(approx_eq(score("mse_100"), 6.25, 1e-3), "{}", score("mse_100"));
    assert!(approx_eq(score("q_25_100"), 0.0, 1e-3), "{}", score("q_25_100"));
    assert!(approx_eq(score("runtime"), 2.5, 1e-9));
    assert!(approx_eq(score("runtime_log"), 2.5f64.log10(), 1e-9));
}

#[test]
fn repeated_runs_are_idempotent() {
    init_logger();
    let ws = dino_workspace();
    let scenes = resolve_scenes(&["dino"], &ws.config).unwrap();
    let metrics = resolve_metrics(&["general"], &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");
    let path = out.join(RESULTS_FILE_NAME);
    let options = EvaluationOptions::default();

    evaluate(&ws.config, &out, &ws.algo_dir("epi1"), &scenes, &metrics, &options).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    evaluate(&ws.config, &out, &ws.algo_dir("epi1"), &scenes, &metrics, &options).unwrap();
    let second = fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_ground_truth_only_fails_its_scene() {
    init_logger();
    let ws = dino_workspace();
    ws.add_scene_without_gt("training", "cotton");
    ws.add_submission("epi1", "cotton", &ramp(WIDTH, HEIGHT), 1.0);

    let scenes = resolve_scenes(&["training"], &ws.config).unwrap();
    let names: Vec<&str> = scenes.iter().map(Scene::name).collect();
    assert_eq!(names, ["cotton", "dino"]);

    let out = ws.config.paths.algo_eval_dir("epi1");
    let report = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &scenes,
        &[Metric::bad_pix(0.07)],
        &EvaluationOptions::default(),
    )
    .unwrap();

    assert!(!report.success);
    assert_eq!(report.messages.len(), 1);
    assert!(report.messages[0].contains("gt_disp_lowres.pfm"), "{}", report.messages[0]);

    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    assert!(!results.contains_key("cotton"));
    assert!(approx_eq(score_value(&results, "dino", "badpix_0070"), 25.0, 1e-6));
}

#[test]
fn missing_runtime_is_reported() {
    init_logger();
    let ws = dino_workspace();
    fs::remove_file(ws.algo_dir("epi1").join("runtimes").join("dino.txt")).unwrap();
    let scene = Scene::load("dino", &ws.config).unwrap();

    let report = evaluate(
        &ws.config,
        &ws.config.paths.algo_eval_dir("epi1"),
        &ws.algo_dir("epi1"),
        &[scene],
        &general_and_runtime(),
        &EvaluationOptions::default(),
    )
    .unwrap();
    assert!(!report.success);
    assert!(report.messages[0].starts_with("Could not find file"));

    let results = load_results(&ws.config.paths.algo_eval_dir("epi1").join(RESULTS_FILE_NAME)).unwrap();
    assert!(approx_eq(score_value(&results, "dino", "badpix_0070"), 25.0, 1e-6));
    assert!(!results["dino"].scores.contains_key("runtime"));
}

#[test]
fn scores_survive_an_aborted_run() {
    init_logger();
    let ws = dino_workspace();
    let gt = ramp(WIDTH, HEIGHT);
    ws.add_scene("training", "cotton", &gt);
    ws.add_submission("epi1", "cotton", &ramp(WIDTH + 1, HEIGHT), 1.0);
    let scenes = resolve_scenes(&["dino", "cotton"], &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");

    let err = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &scenes,
        &[Metric::bad_pix(0.07)],
        &EvaluationOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EvalError::ShapeMismatch { .. }), "{err}");

    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    assert!(approx_eq(score_value(&results, "dino", "badpix_0070"), 25.0, 1e-6));
    assert!(!results.contains_key("cotton"));
}

#[test]
fn region_metrics_use_their_masks_and_resolution() {
    init_logger();
    let ws = dino_workspace();
    // high-res columns 8 and 9 sample the shifted low-res column 4
    ws.add_mask("training", "dino", "mask_discontinuities_highres.png", |x, _| {
        (8..12).contains(&x)
    });
    ws.add_mask("training", "dino", "mask_planes_lowres.png", |x, _| x >= 8);
    let scene = Scene::load("dino", &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");

    let discontinuities = Metric::Discontinuities(BadPixParams::default());
    let bumpiness = Metric::BumpinessPlanes(BumpinessParams::default());
    let fine_thinning = Metric::FineThinning(BadPixParams { thresh: 0.15 });
    let low_texture = Metric::StripesLowTexture(BadPixParams::default());
    let metrics = [
        discontinuities.clone(),
        bumpiness.clone(),
        Metric::MaePlanes,
        fine_thinning.clone(),
        low_texture.clone(),
    ];
    assert!(!fine_thinning.is_applicable(&scene));
    assert!(!low_texture.is_applicable(&scene));

    let report = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &[scene],
        &metrics,
        &EvaluationOptions::default(),
    )
    .unwrap();
    assert!(report.success, "{:?}", report.messages);

    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    let score = |m: &Metric| score_value(&results, "dino", &m.id());
    assert!(approx_eq(score(&discontinuities), 50.0, 1e-6), "{}", score(&discontinuities));
    assert!(approx_eq(score(&bumpiness), 0.0, 1e-6), "{}", score(&bumpiness));
    assert!(approx_eq(score(&Metric::MaePlanes), 0.0, 1e-3), "{}", score(&Metric::MaePlanes));
    assert!(!results["dino"].scores.contains_key(&fine_thinning.id()));
    assert!(!results["dino"].scores.contains_key(&low_texture.id()));
}

#[test]
fn stratified_scene_scores_at_high_resolution() {
    init_logger();
    let ws = Workspace::new();
    let gt = ramp(WIDTH, HEIGHT);
    ws.add_scene("stratified", "stripes", &gt);
    ws.add_mask("stratified", "stripes", "mask_low_texture_highres.png", |x, _| x < 16);
    ws.add_mask("stratified", "stripes", "mask_discontinuities_highres.png", |_, _| true);
    ws.add_submission("epi1", "stripes", &with_offset_left(&gt, 5, 0.5), 1.0);
    let scene = Scene::load("stripes", &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");

    let low_texture = Metric::StripesLowTexture(BadPixParams::default());
    let discontinuities = Metric::Discontinuities(BadPixParams::default());
    let report = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &[scene],
        &[Metric::bad_pix(0.07), low_texture.clone(), discontinuities.clone()],
        &EvaluationOptions::default(),
    )
    .unwrap();
    assert!(report.success, "{:?}", report.messages);

    // high-res columns 4..10 of the evaluated 4..28 are shifted
    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    let score = |id: &str| score_value(&results, "stripes", id);
    assert!(approx_eq(score("badpix_0070"), 25.0, 1e-6), "{}", score("badpix_0070"));
    assert!(approx_eq(score(&low_texture.id()), 50.0, 1e-6), "{}", score(&low_texture.id()));
    assert!(!results["stripes"].scores.contains_key(&discontinuities.id()));
}

#[test]
fn visualization_writes_figures_and_raw_copy() {
    init_logger();
    let ws = dino_workspace();
    let scene = Scene::load("dino", &ws.config).unwrap();
    let out = ws.config.paths.algo_eval_dir("epi1");
    let options = EvaluationOptions {
        visualize: true,
        ..Default::default()
    };

    let report = evaluate(
        &ws.config,
        &out,
        &ws.algo_dir("epi1"),
        &[scene],
        &[Metric::bad_pix(0.07)],
        &options,
    )
    .unwrap();
    assert!(report.success, "{:?}", report.messages);

    let results = load_results(&out.join(RESULTS_FILE_NAME)).unwrap();
    let dino = &results["dino"];
    let figure = dino.algorithm_result.as_ref().unwrap();
    assert_eq!(figure.thumb, "training/dino_dispmap.png");
    assert_eq!(figure.raw.as_deref(), Some("training/dino_dispmap.pfm"));
    assert_eq!((figure.height, figure.width), (HEIGHT, WIDTH));
    assert!(out.join(&figure.thumb).is_file());
    assert!(out.join("training/dino_dispmap.pfm").is_file());

    let vis = dino.scores["badpix_0070"].visualization.as_ref().unwrap();
    assert_eq!(vis.thumb, "training/dino_badpix_0070.png");
    let img = image::open(out.join(&vis.thumb)).unwrap();
    assert_eq!((img.width() as usize, img.height() as usize), (WIDTH, HEIGHT));
}

#[test]
fn unknown_scene_names_are_rejected() {
    let ws = dino_workspace();
    let err = resolve_scenes(&["bedroom"], &ws.config).unwrap_err();
    assert!(err.starts_with("Could not find scene for: bedroom."), "{err}");
    assert!(err.contains("Available scenes are: dino."));
}
