//! Standard metric sets and lookup by id or group name.
use super::{BadPixParams, BumpinessParams, Metric, MissedDotsParams, MseParams};
use crate::config::ToolkitConfig;

pub const METRIC_GROUP_NAMES: [&str; 5] =
    ["general", "stratified", "regions", "all_wo_runtime", "all"];

/// MSE, BadPix at 0.01/0.03/0.07 and Q25.
pub fn general_metrics() -> Vec<Metric> {
    vec![
        Metric::mse(),
        Metric::bad_pix(0.01),
        Metric::bad_pix(0.03),
        Metric::bad_pix(0.07),
        Metric::quantile(25),
    ]
}

/// Metrics on the semantic regions of photorealistic scenes.
pub fn region_metrics(config: &ToolkitConfig) -> Vec<Metric> {
    let bump = BumpinessParams::default();
    vec![
        Metric::BumpinessPlanes(bump),
        Metric::BumpinessContinSurf(bump),
        Metric::MaePlanes,
        Metric::MaeContinSurf,
        Metric::Discontinuities(BadPixParams {
            thresh: config.bad_pix_thresh,
        }),
        Metric::FineFattening(BadPixParams { thresh: -0.15 }),
        Metric::FineThinning(BadPixParams { thresh: 0.15 }),
    ]
}

/// Scene-specific metrics of Backgammon, Pyramids, Dots and Stripes.
pub fn stratified_metrics(config: &ToolkitConfig) -> Vec<Metric> {
    let bad_pix = BadPixParams {
        thresh: config.bad_pix_thresh,
    };
    let bump = BumpinessParams::default();
    vec![
        Metric::BackgammonFattening(bad_pix),
        Metric::BackgammonThinning(bad_pix),
        Metric::PyramidsSlantedBumpiness(bump),
        Metric::PyramidsParallelBumpiness(bump),
        Metric::DotsBackgroundMse(MseParams::default()),
        Metric::MissedDots(MissedDotsParams::default()),
        Metric::StripesLowTexture(bad_pix),
        Metric::DarkStripes(bad_pix),
        Metric::BrightStripes(bad_pix),
    ]
}

pub fn all_metrics_wo_runtime(config: &ToolkitConfig) -> Vec<Metric> {
    let mut metrics = general_metrics();
    metrics.extend(stratified_metrics(config));
    metrics.extend(region_metrics(config));
    metrics
}

pub fn all_metrics(config: &ToolkitConfig) -> Vec<Metric> {
    let mut metrics = all_metrics_wo_runtime(config);
    metrics.push(Metric::runtime(true));
    metrics.push(Metric::runtime(false));
    metrics
}

/// Metrics of a named group, `None` for an unknown name.
pub fn metric_group(name: &str, config: &ToolkitConfig) -> Option<Vec<Metric>> {
    match name {
        "general" => Some(general_metrics()),
        "stratified" => Some(stratified_metrics(config)),
        "regions" => Some(region_metrics(config)),
        "all_wo_runtime" => Some(all_metrics_wo_runtime(config)),
        "all" => Some(all_metrics(config)),
        _ => None,
    }
}

/// Metric of the full catalog with the given id.
pub fn metric_by_id(id: &str, config: &ToolkitConfig) -> Option<Metric> {
    all_metrics(config).into_iter().find(|m| m.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let cfg = ToolkitConfig::default();
        let all = all_metrics(&cfg);
        assert_eq!(all.len(), 5 + 9 + 7 + 2);
        let ids: HashSet<String> = all.iter().map(Metric::id).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn groups_resolve_by_name() {
        let cfg = ToolkitConfig::default();
        for name in METRIC_GROUP_NAMES {
            assert!(metric_group(name, &cfg).is_some(), "{name}");
        }
        assert!(metric_group("unknown", &cfg).is_none());
        assert_eq!(
            metric_by_id("discontinuities_0070", &cfg),
            Some(Metric::Discontinuities(BadPixParams::default()))
        );
    }
}
