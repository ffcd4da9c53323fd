use env_logger::Env;
use lf_bench::config::validation::load_config;
use lf_bench::evaluation::validate_extracted_submission;
use lf_bench::image::io::write_json_file;
use lf_bench::scene::catalog::benchmark_scene_names;
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

    let scene_names: Vec<String> = if config.scenes.is_empty() {
        benchmark_scene_names().into_iter().map(str::to_string).collect()
    } else {
        config.scenes.clone()
    };

    let report = validate_extracted_submission(
        &config.submission,
        &scene_names,
        config.toolkit.submission_width,
        config.toolkit.submission_height,
    );

    if let Some(path) = &config.report_json {
        write_json_file(path, &report).map_err(|e| e.to_string())?;
        println!("Validation report written to {}", path.display());
    }

    if report.success {
        println!(
            "Submission {} is valid ({} scenes)",
            config.submission.display(),
            scene_names.len()
        );
        Ok(())
    } else {
        for message in &report.messages {
            println!("{message}");
        }
        Err(format!(
            "Submission validation failed with {} error(s)",
            report.messages.len()
        ))
    }
}

fn usage() -> String {
    "Usage: validate_submission <config.json>".to_string()
}
