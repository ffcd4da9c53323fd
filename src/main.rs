use env_logger::Env;
use lf_bench::algorithms::{prepare_meta_algorithms, AlgorithmStore};
use lf_bench::config::evaluation::load_config;
use lf_bench::config::resolve::{
    resolve_algorithms, resolve_meta_algorithms, resolve_metrics, resolve_scenes,
};
use lf_bench::evaluation::{evaluate, EvaluationReport};
use lf_bench::image::io::write_json_file;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

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

    if !config.meta_algorithms.is_empty() {
        let metas = resolve_meta_algorithms(&config.meta_algorithms)?;
        let store = AlgorithmStore::new(&toolkit.paths.algo_path);
        prepare_meta_algorithms(&metas, &store, &algorithms, &scenes).map_err(|e| e.to_string())?;
        algorithms.extend(metas.iter().map(|m| m.algorithm()));
    }

    let mut reports: BTreeMap<String, EvaluationReport> = BTreeMap::new();
    for algorithm in &algorithms {
        let report = evaluate(
            toolkit,
            &toolkit.paths.algo_eval_dir(algorithm.name()),
            &toolkit.paths.algo_dir(algorithm.name()),
            &scenes,
            &metrics,
            &config.options,
        )
        .map_err(|e| format!("Evaluation of {algorithm} failed: {e}"))?;

        if report.success {
            println!(
                "{}: scored {} scene(s) in {:.1} ms",
                algorithm,
                scenes.len(),
                report.timing.total_ms
            );
        } else {
            println!("{}: {} scene(s) failed", algorithm, report.messages.len());
            for message in &report.messages {
                println!("  {message}");
            }
        }
        reports.insert(algorithm.file_name.clone(), report);
    }

    if let Some(path) = &config.output.report_json {
        write_json_file(path, &reports).map_err(|e| e.to_string())?;
        println!("Evaluation report written to {}", path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: lf-bench <config.json>".to_string()
}
