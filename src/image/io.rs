//! File helpers for benchmark data.
//!
//! - `load_mask` / `load_label_map`: read PNG region files as boolean masks or u8 label ids.
//! - `load_rgb_image`: read the center view of a scene.
//! - `save_rgb_png`: write a rendered visualization.
//! - `read_runtime` / `write_runtime`: single-float runtime text files.
//! - `read_json_file` / `write_json_file`: serde JSON with sorted keys and 4-space indentation.
use super::{LabelMap, Mask};
use crate::error::EvalError;
use image::RgbImage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a region file; every non-zero pixel is part of the region.
pub fn load_mask(path: &Path) -> Result<Mask, EvalError> {
    let labels = load_label_map(path)?;
    Ok(labels.as_view().to_mask())
}

/// Load an image and keep its 8-bit luma values as label ids.
pub fn load_label_map(path: &Path) -> Result<LabelMap, EvalError> {
    let img = image::open(path)
        .map_err(|e| EvalError::image(path, e))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw();
    LabelMap::from_vec(width, height, data).ok_or_else(|| EvalError::Parameters {
        path: path.to_path_buf(),
        reason: "label image buffer does not match its dimensions".to_string(),
    })
}

/// Load an image from disk and convert to 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage, EvalError> {
    Ok(image::open(path)
        .map_err(|e| EvalError::image(path, e))?
        .into_rgb8())
}

/// Save an RGB buffer as PNG, creating parent directories.
pub fn save_rgb_png(image: &RgbImage, path: &Path) -> Result<(), EvalError> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|e| EvalError::image(path, e))
}

/// Read a runtime in seconds from the first line of a text file.
pub fn read_runtime(path: &Path) -> Result<f64, EvalError> {
    let contents = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let line = contents.lines().next().unwrap_or("");
    line.trim()
        .parse::<f64>()
        .map_err(|e| EvalError::MalformedRuntime {
            path: path.to_path_buf(),
            line: line.to_string(),
            reason: e.to_string(),
        })
}

/// Write a runtime with ten decimal places.
pub fn write_runtime(path: &Path, runtime: f64) -> Result<(), EvalError> {
    ensure_parent_dir(path)?;
    fs::write(path, format!("{runtime:.10}")).map_err(|e| EvalError::io(path, e))
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, EvalError> {
    let data = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::from_str(&data).map_err(|source| EvalError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
///
/// The value is routed through `serde_json::Value` so object keys come out
/// sorted, and indented with four spaces.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), EvalError> {
    ensure_parent_dir(path)?;
    let json_err = |source| EvalError::Json {
        path: path.to_path_buf(),
        source,
    };
    let value = serde_json::to_value(value).map_err(json_err)?;
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(json_err)?;
    fs::write(path, buf).map_err(|e| EvalError::io(path, e))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), EvalError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
    }
    Ok(())
}
