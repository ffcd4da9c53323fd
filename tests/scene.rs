mod common;

use common::synthetic_scene::{ramp, Workspace, BOUNDARY_OFFSET, HEIGHT, HIGH_RES_SCALE, WIDTH};
use lf_bench::algorithms::store::load_algo_result_from_dir;
use lf_bench::algorithms::AlgorithmStore;
use lf_bench::config::resolve::resolve_algorithms;
use lf_bench::evaluation::visualize::save_scene_figures;
use lf_bench::error::EvalError;
use lf_bench::image::pfm::write_pfm;
use lf_bench::image::resample::resize_f32;
use lf_bench::image::{ImageF32, Interpolation};
use lf_bench::scene::catalog::available_scenes_by_category;
use lf_bench::scene::{Resolution, Scene, SceneCategory};

fn high_shape() -> (usize, usize) {
    (
        (HEIGHT as f64 * HIGH_RES_SCALE) as usize,
        (WIDTH as f64 * HIGH_RES_SCALE) as usize,
    )
}

#[test]
fn rasters_match_the_requested_resolution() {
    let ws = Workspace::new();
    ws.add_scene("training", "dino", &ramp(WIDTH, HEIGHT));
    let scene = Scene::load("dino", &ws.config).unwrap();

    assert_eq!(scene.category(), SceneCategory::Training);
    assert_eq!(scene.display_name(), "Dino");
    assert_eq!(scene.shape(Resolution::Low), (HEIGHT, WIDTH));
    assert_eq!(scene.shape(Resolution::High), high_shape());
    assert_eq!(scene.gt(Resolution::Low).unwrap().shape(), (HEIGHT, WIDTH));
    assert_eq!(scene.gt(Resolution::High).unwrap().shape(), high_shape());
    assert_eq!(scene.general_metric_resolution(), Resolution::Low);

    let boundary = scene.boundary_mask(Resolution::Low);
    let inner = (WIDTH - 2 * BOUNDARY_OFFSET) * (HEIGHT - 2 * BOUNDARY_OFFSET);
    assert_eq!(boundary.count(), inner);
}

#[test]
fn high_res_is_resampled_when_scales_differ() {
    let ws = Workspace::new();
    ws.add_scene("training", "dino", &ramp(WIDTH, HEIGHT));
    let mut config = ws.config.clone();
    config.high_res_scale = 3.0;
    let scene = Scene::load("dino", &config).unwrap();

    let gt = scene.gt(Resolution::High).unwrap();
    assert_eq!(gt.shape(), (HEIGHT * 3, WIDTH * 3));
    assert_eq!(gt.get(0, 0), -1.0);
    assert_eq!(gt.get(WIDTH * 3 - 1, 0), 1.0);
}

#[test]
fn downsampled_high_res_matches_low_res() {
    let ws = Workspace::new();
    let gt = ramp(WIDTH, HEIGHT);
    ws.add_scene("training", "dino", &gt);
    let step = 2.0 / (WIDTH - 1) as f32;

    for scale in [HIGH_RES_SCALE, 3.0] {
        let mut config = ws.config.clone();
        config.high_res_scale = scale;
        let scene = Scene::load("dino", &config).unwrap();
        let low = scene.gt(Resolution::Low).unwrap();
        let high = scene.gt(Resolution::High).unwrap();
        let back = resize_f32(&high, WIDTH, HEIGHT, Interpolation::Nearest);
        assert_eq!(back.shape(), low.shape());
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let diff = (back.get(x, y) - low.get(x, y)).abs();
                assert!(diff <= step, "scale {scale} at ({x}, {y}): {diff}");
            }
        }
    }
}

#[test]
fn stratified_scenes_score_general_metrics_at_high_res() {
    let ws = Workspace::new();
    let gt = ramp(WIDTH, HEIGHT);
    ws.add_scene("stratified", "backgammon", &gt);
    ws.add_scene("stratified", "pyramids", &gt);
    ws.add_mask("stratified", "pyramids", "mask_plane_lowres.png", |x, _| x > 3);

    let backgammon = Scene::load("backgammon", &ws.config).unwrap();
    let pyramids = Scene::load("pyramids", &ws.config).unwrap();
    assert_eq!(backgammon.general_metric_resolution(), Resolution::High);
    assert_eq!(pyramids.general_metric_resolution(), Resolution::Low);

    let plane = pyramids.mask("mask_plane", Resolution::Low).unwrap();
    assert_eq!(plane.count(), (WIDTH - 4) * HEIGHT);

    let available = available_scenes_by_category(&ws.config.paths.data_path, None).unwrap();
    assert_eq!(available[&SceneCategory::Stratified], ["backgammon", "pyramids"]);
}

#[test]
fn submissions_are_zoomed_and_shape_checked() {
    let ws = Workspace::new();
    ws.add_scene("training", "dino", &ramp(WIDTH, HEIGHT));
    let scene = Scene::load("dino", &ws.config).unwrap();
    let algo_dir = ws.algo_dir("epi1");

    ws.add_submission("epi1", "dino", &ramp(WIDTH, HEIGHT), 1.0);
    let high = load_algo_result_from_dir(&algo_dir, &scene, Resolution::High).unwrap();
    assert_eq!(high.shape(), high_shape());

    write_pfm(
        &algo_dir.join("disp_maps/dino.pfm"),
        &ImageF32::filled(WIDTH + 1, HEIGHT, 0.0),
    )
    .unwrap();
    let err = load_algo_result_from_dir(&algo_dir, &scene, Resolution::Low).unwrap_err();
    assert!(matches!(err, EvalError::ShapeMismatch { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn scene_figures_cover_view_and_normals() {
    let ws = Workspace::new();
    let dino = ws.add_scene("training", "dino", &ImageF32::filled(WIDTH, HEIGHT, 0.2));
    ws.add_scene("training", "cotton", &ImageF32::filled(WIDTH, HEIGHT, 0.2));
    image::RgbImage::from_pixel(WIDTH as u32, HEIGHT as u32, image::Rgb([10, 20, 30]))
        .save(dino.join("input_Cam040.png"))
        .unwrap();
    ws.add_submission("epi1", "dino", &ramp(WIDTH, HEIGHT), 1.0);

    let algorithms = resolve_algorithms(&["epi1"], &ws.config).unwrap();
    let store = AlgorithmStore::new(&ws.config.paths.algo_path);
    let figures = ws.dir.path().join("figures");

    let scene = Scene::load("dino", &ws.config).unwrap();
    assert_eq!(scene.center_cam(), 40);
    assert_eq!(save_scene_figures(&scene, &store, &algorithms, &figures).unwrap(), 3);
    for descr in ["center_view", "normals_gt", "normals_epi1"] {
        let img = image::open(figures.join(format!("training/dino_{descr}.png"))).unwrap();
        assert_eq!((img.width() as usize, img.height() as usize), (WIDTH, HEIGHT));
    }
    let normals = image::open(figures.join("training/dino_normals_gt.png"))
        .unwrap()
        .into_rgb8();
    let [r, g, _] = normals.get_pixel(5, 5).0;
    assert!((127..=128).contains(&r) && (127..=128).contains(&g), "{r} {g}");

    // no center view and no submission
    let cotton = Scene::load("cotton", &ws.config).unwrap();
    assert_eq!(save_scene_figures(&cotton, &store, &algorithms, &figures).unwrap(), 1);
    assert!(figures.join("training/cotton_normals_gt.png").is_file());
}
