use env_logger::Env;
use lf_bench::algorithms::AlgorithmStore;
use lf_bench::config::meta::load_config;
use lf_bench::config::resolve::{resolve_algorithms, resolve_meta_algorithms, resolve_scenes};
use lf_bench::diagnostics::TimingBreakdown;
use std::env;
use std::path::Path;
use std::time::Instant;

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

    let metas = resolve_meta_algorithms(&config.meta_algorithms)?;
    let algorithms = resolve_algorithms(&config.algorithms, toolkit)?;
    let scenes = resolve_scenes(&config.scenes, toolkit)?;
    let store = AlgorithmStore::new(&toolkit.paths.algo_path);

    let start = Instant::now();
    let mut timing = TimingBreakdown::default();
    for meta in &metas {
        timing
            .measure(meta.file_name(), || {
                meta.compute_meta_results(&store, &algorithms, &scenes)
            })
            .map_err(|e| e.to_string())?;
    }
    timing.finish(start);

    for stage in &timing.stages {
        println!(
            "{} from {} algorithm(s) on {} scene(s): {:.1} ms",
            stage.label,
            algorithms.len(),
            scenes.len(),
            stage.elapsed_ms
        );
    }
    println!(
        "Saved meta-algorithm results to {} ({:.1} ms total)",
        store.root().display(),
        timing.total_ms
    );
    Ok(())
}

fn usage() -> String {
    "Usage: compute_meta_algorithms <config.json>".to_string()
}
