use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock cost of scoring one scene, or of computing one meta-algorithm
/// over a scene set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
    /// The stage ended with an error (its scores are partial or missing).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

/// Timing of a whole run: one stage per scene, in processing order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Record a stage that started at `start` and ends now.
    pub fn record(&mut self, label: impl Into<String>, start: Instant, failed: bool) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms: elapsed_ms(start),
            failed,
        });
    }

    /// Run a fallible stage; an `Err` marks the stage failed and is passed on.
    pub fn measure<T, E>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let start = Instant::now();
        let out = f();
        self.record(label, start, out.is_err());
        out
    }

    /// Close the run that started at `run_start`.
    pub fn finish(&mut self, run_start: Instant) {
        self.total_ms = elapsed_ms(run_start);
    }

    pub fn slowest(&self) -> Option<&StageTiming> {
        self.stages
            .iter()
            .max_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))
    }

    pub fn failed_labels(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().filter(|s| s.failed).map(|s| s.label.as_str())
    }
}

/// Milliseconds since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_scenes_are_flagged_in_order() {
        let run_start = Instant::now();
        let mut timing = TimingBreakdown::default();
        timing.record("dino", Instant::now(), false);
        let err: Result<(), String> = timing.measure("cotton", || Err("missing gt".into()));
        assert!(err.is_err());
        let ok: Result<u32, String> = timing.measure("boxes", || Ok(42));
        assert_eq!(ok, Ok(42));
        timing.finish(run_start);

        let labels: Vec<&str> = timing.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["dino", "cotton", "boxes"]);
        assert_eq!(timing.failed_labels().collect::<Vec<_>>(), ["cotton"]);
        assert!(timing.slowest().is_some());
        assert!(timing.total_ms >= 0.0);
    }

    #[test]
    fn only_failed_stages_serialize_the_flag() {
        let mut timing = TimingBreakdown::default();
        timing.record("dino", Instant::now(), false);
        timing.record("cotton", Instant::now(), true);
        let json = serde_json::to_value(&timing).unwrap();
        assert!(json["stages"][0].get("failed").is_none());
        assert_eq!(json["stages"][1]["failed"], true);
        assert!(json.get("totalMs").is_some());
    }
}
