//! Diagnostics attached to tool reports.
//!
//! Currently this is the wall-clock timing of the evaluation and
//! meta-algorithm runs, one stage per scene.

pub mod timing;

pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
