#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod algorithms;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod image;
pub mod metrics;
pub mod scene;

// Supporting modules: numerical building blocks and analysis helpers.
pub mod analysis;
pub mod diagnostics;
pub mod filters;

// --- High-level re-exports -------------------------------------------------

// Main entry points: scenes, metrics and the scoring pipeline.
pub use crate::algorithms::{Algorithm, AlgorithmStore, MetaAlgorithm};
pub use crate::config::ToolkitConfig;
pub use crate::error::EvalError;
pub use crate::evaluation::{evaluate, EvaluationOptions, EvaluationReport};
pub use crate::metrics::Metric;
pub use crate::scene::{Resolution, Scene, SceneCategory};

// Timing attached to evaluation reports.
pub use crate::diagnostics::{StageTiming, TimingBreakdown};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for scripts that score a submission.
///
/// ```no_run
/// use lf_bench::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> Result<(), EvalError> {
/// let config = ToolkitConfig::default();
/// let scene = Scene::load("dino", &config)?;
/// let report = evaluate(
///     &config,
///     Path::new("evaluation/epi1"),
///     Path::new("algo_results/epi1"),
///     &[scene],
///     &lf_bench::metrics::general_metrics(),
///     &EvaluationOptions::default(),
/// )?;
/// println!("success={} scenes={}", report.success, report.timing.stages.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, Mask};
    pub use crate::{
        evaluate, Algorithm, EvalError, EvaluationOptions, Metric, Resolution, Scene,
        ToolkitConfig,
    };
}
