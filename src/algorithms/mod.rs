//! Submitted algorithms and the synthetic meta-algorithms derived from them.
//!
//! An [`Algorithm`] is a handle: its disparity maps and runtimes live on disk
//! under the layout managed by [`AlgorithmStore`].
pub mod meta;
pub mod store;

pub use meta::{prepare_meta_algorithms, MetaAlgorithm};
pub use store::AlgorithmStore;

use crate::config::ToolkitConfig;
use crate::error::EvalError;
use crate::image::io;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Plot line style of an algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    /// Dense dots; used for meta-algorithms.
    Dotted,
}

/// Entry of `meta_data.json`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AlgorithmMetaData {
    #[serde(default)]
    pub acronym: Option<String>,
}

/// Contents of `meta_data.json`, keyed by algorithm file name.
pub type MetaDataTable = BTreeMap<String, AlgorithmMetaData>;

/// Read `meta_data.json`; a missing file yields an empty table.
pub fn load_meta_data(path: &Path) -> Result<MetaDataTable, EvalError> {
    match io::read_json_file(path) {
        Ok(table) => Ok(table),
        Err(err) if err.is_not_found() => {
            log::debug!("No algorithm meta data at {}", path.display());
            Ok(MetaDataTable::new())
        }
        Err(err) => Err(err),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    /// Name of the submission directory; unique.
    pub file_name: String,
    pub display_name: String,
    pub is_baseline: bool,
    pub is_meta: bool,
    /// RGB in `[0, 1]`; assigned positionally by [`set_colors`].
    pub color: Option<[f64; 3]>,
    pub line_style: LineStyle,
}

impl Algorithm {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            display_name: file_name.to_uppercase(),
            file_name,
            is_baseline: false,
            is_meta: false,
            color: None,
            line_style: LineStyle::Solid,
        }
    }

    pub fn meta(file_name: &str, display_name: &str, color: [f64; 3]) -> Self {
        Self {
            display_name: display_name.to_string(),
            is_meta: true,
            color: Some(color),
            line_style: LineStyle::Dotted,
            ..Self::new(file_name)
        }
    }

    pub fn name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Orders by display name.
pub fn compare_by_display_name(a: &Algorithm, b: &Algorithm) -> Ordering {
    a.display_name.cmp(&b.display_name)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlgorithmFlags {
    pub baseline: bool,
    pub meta: bool,
}

/// Build handles for `file_names`, taking display names from the `acronym`
/// entries of `meta_data`.
pub fn initialize_algorithms<S: AsRef<str>>(
    file_names: &[S],
    meta_data: &MetaDataTable,
    flags: AlgorithmFlags,
) -> Vec<Algorithm> {
    file_names
        .iter()
        .map(|name| {
            let mut algorithm = Algorithm::new(name.as_ref());
            algorithm.is_baseline = flags.baseline;
            algorithm.is_meta = flags.meta;
            if flags.meta {
                algorithm.line_style = LineStyle::Dotted;
            }
            if let Some(acronym) = meta_data
                .get(name.as_ref())
                .and_then(|m| m.acronym.as_deref())
                .filter(|a| !a.is_empty())
            {
                algorithm.display_name = acronym.to_string();
            }
            algorithm
        })
        .collect()
}

/// Assign palette colours in order, starting at palette index `offset`.
pub fn set_colors(algorithms: &mut [Algorithm], config: &ToolkitConfig, offset: usize) {
    for (idx, algorithm) in algorithms.iter_mut().enumerate() {
        algorithm.color = Some(config.color(idx + offset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_default_to_upper_case() {
        let mut meta = MetaDataTable::new();
        meta.insert(
            "epi1".into(),
            AlgorithmMetaData {
                acronym: Some("EPI1-X".into()),
            },
        );
        meta.insert("lf".into(), AlgorithmMetaData::default());
        let cfg = ToolkitConfig::default();
        let mut algos = initialize_algorithms(&["lf", "epi1"], &meta, AlgorithmFlags::default());
        set_colors(&mut algos, &cfg, 0);

        assert_eq!(algos[0].display_name, "LF");
        assert_eq!(algos[1].display_name, "EPI1-X");
        assert_eq!(algos[1].color, Some(cfg.color(1)));
        assert_eq!(algos[0].line_style, LineStyle::Solid);

        algos.sort_by(compare_by_display_name);
        assert_eq!(algos[0].file_name, "epi1");
    }

    #[test]
    fn missing_meta_data_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_meta_data(&dir.path().join("meta_data.json")).unwrap();
        assert!(table.is_empty());
    }
}
