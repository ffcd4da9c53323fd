//! Scene calibration read from `parameters.cfg`.
//!
//! The file is INI-style: `[section]` headers followed by `key = value` (or
//! `key: value`) lines. Keys are case-insensitive; `#` and `;` start comment
//! lines. Only the `intrinsics`, `extrinsics` and `meta` sections are used.
use crate::error::EvalError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Camera and disparity-range parameters of one scene at low resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParameters {
    pub width: usize,
    pub height: usize,
    pub focal_length_mm: f64,
    pub sensor_size_mm: f64,
    pub num_cams_x: usize,
    pub num_cams_y: usize,
    pub baseline_mm: f64,
    pub focus_distance_m: f64,
    pub disp_min: f64,
    pub disp_max: f64,
    /// Scale of the stored `*_highres` files relative to the low-res grid.
    pub highres_scale: f64,
}

impl SceneParameters {
    pub fn from_file(path: &Path) -> Result<Self, EvalError> {
        let text = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::parse(&text).map_err(|reason| EvalError::Parameters {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let sections = parse_sections(text)?;
        let get = |section: &str, key: &str| -> Result<&str, String> {
            sections
                .get(section)
                .ok_or_else(|| format!("missing section [{section}]"))?
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| format!("missing option '{key}' in section [{section}]"))
        };

        Ok(Self {
            width: parse_value(get("intrinsics", "image_resolution_x_px")?, "image_resolution_x_px")?,
            height: parse_value(get("intrinsics", "image_resolution_y_px")?, "image_resolution_y_px")?,
            focal_length_mm: parse_value(get("intrinsics", "focal_length_mm")?, "focal_length_mm")?,
            sensor_size_mm: parse_value(get("intrinsics", "sensor_size_mm")?, "sensor_size_mm")?,
            num_cams_x: parse_value(get("extrinsics", "num_cams_x")?, "num_cams_x")?,
            num_cams_y: parse_value(get("extrinsics", "num_cams_y")?, "num_cams_y")?,
            baseline_mm: parse_value(get("extrinsics", "baseline_mm")?, "baseline_mm")?,
            focus_distance_m: parse_value(get("extrinsics", "focus_distance_m")?, "focus_distance_m")?,
            disp_min: parse_value(get("meta", "disp_min")?, "disp_min")?,
            disp_max: parse_value(get("meta", "disp_max")?, "disp_max")?,
            highres_scale: parse_value(get("meta", "depth_map_scale")?, "depth_map_scale")?,
        })
    }
}

fn parse_value<T: FromStr>(raw: &str, key: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    // integer options may be written as "512.0"
    raw.parse::<T>().or_else(|e| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .and_then(|v| format!("{}", v as i64).parse::<T>().ok())
            .ok_or_else(|| format!("invalid value '{raw}' for '{key}': {e}"))
    })
}

fn parse_sections(text: &str) -> Result<Sections, String> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| format!("line {}: malformed section header", lineno + 1))?;
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let section = current
            .as_ref()
            .ok_or_else(|| format!("line {}: option outside of a section", lineno + 1))?;
        let split = line
            .find(['=', ':'])
            .ok_or_else(|| format!("line {}: expected 'key = value'", lineno + 1))?;
        let key = line[..split].trim().to_lowercase();
        let value = line[split + 1..].trim().to_string();
        sections.entry(section.clone()).or_default().insert(key, value);
    }
    Ok(sections)
}
