//! Region masks available for a scene, discovered once when the scene is
//! loaded so that metric applicability is a pure lookup.
use super::Resolution;
use crate::error::EvalError;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const MASK_PLANES: &str = "mask_planes";
pub const MASK_SMOOTH_SURFACES: &str = "mask_smooth_surfaces";
pub const MASK_DISCONTINUITIES: &str = "mask_discontinuities";
pub const MASK_FINE: &str = "mask_fine";
pub const MASK_FINE_SURROUNDING: &str = "mask_fine_surrounding";

// backgammon
pub const MASK_FOREGROUND: &str = "mask_foreground";
pub const MASK_BACKGROUND: &str = "mask_background";
pub const MASK_FOREGROUND_THINNING: &str = "mask_foreground_thinning";
pub const MASK_FOREGROUND_FATTENING: &str = "mask_foreground_fattening";
pub const MASK_VERTICAL_BINS: &str = "mask_vertical_bins";

// dots
pub const MASK_DOTS_BY_SIZE: &str = "mask_dots_by_size";
pub const MASK_BOXES: &str = "mask_boxes";

// pyramids
pub const MASK_PLANE: &str = "mask_plane";
pub const MASK_SPHERE_IN: &str = "mask_sphere_in";
pub const MASK_SPHERE_OUT: &str = "mask_sphere_out";
pub const MASK_PYRAMIDS: &str = "mask_pyramids";

// stripes
pub const MASK_HIGH_CONTRAST: &str = "mask_high_contrast";
pub const MASK_LOW_CONTRAST: &str = "mask_low_contrast";
pub const MASK_LOW_TEXTURE: &str = "mask_low_texture";

/// Names of the `mask_*_{lowres,highres}.png` files in a scene directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionIndex {
    low: BTreeSet<String>,
    high: BTreeSet<String>,
}

impl RegionIndex {
    pub fn scan(dir: &Path) -> Result<Self, EvalError> {
        let mut index = RegionIndex::default();
        let entries = fs::read_dir(dir).map_err(|e| EvalError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| EvalError::io(dir, e))?;
            if let Some(file_name) = entry.file_name().to_str() {
                index.register_file(file_name);
            }
        }
        Ok(index)
    }

    fn register_file(&mut self, file_name: &str) {
        let Some(stem) = file_name.strip_suffix(".png") else {
            return;
        };
        if !stem.starts_with("mask_") {
            return;
        }
        if let Some(name) = stem.strip_suffix("_lowres") {
            self.low.insert(name.to_string());
        } else if let Some(name) = stem.strip_suffix("_highres") {
            self.high.insert(name.to_string());
        }
    }

    pub fn contains_at(&self, name: &str, resolution: Resolution) -> bool {
        match resolution {
            Resolution::Low => self.low.contains(name),
            Resolution::High => self.high.contains(name),
        }
    }

    /// True if the region exists at either resolution.
    pub fn contains(&self, name: &str) -> bool {
        self.low.contains(name) || self.high.contains(name)
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.low
            .iter()
            .chain(self.high.iter())
            .map(String::as_str)
            .collect()
    }
}
