//! Region helpers of the stratified scenes.
use super::regions::{MASK_PYRAMIDS, MASK_SPHERE_IN, MASK_SPHERE_OUT};
use super::{Resolution, Scene};
use crate::error::EvalError;
use crate::image::{ImageF32, ImageF64, Mask};

/// Ground-truth column at which the Backgammon foreground plane is sampled
/// (low-res pixels from the left border).
pub const BACKGAMMON_FG_COLUMN: usize = 14;
/// Distance of the sampled background column from the right border.
pub const BACKGAMMON_BG_COLUMN_FROM_RIGHT: usize = 11;

impl Scene {
    /// Backgammon foreground plane: the ground-truth column at
    /// `14 · scale` repeated over the whole image.
    pub fn fg_extrapolation(&self, gt: &ImageF32, resolution: Resolution) -> ImageF64 {
        let col = (BACKGAMMON_FG_COLUMN as f64 * self.scale(resolution)) as usize;
        broadcast_column(gt, col.min(gt.w.saturating_sub(1)))
    }

    /// Backgammon background plane: the ground-truth column 11 pixels (at
    /// the evaluated resolution) from the right border.
    pub fn bg_extrapolation(&self, gt: &ImageF32) -> ImageF64 {
        let col = gt.w.saturating_sub(BACKGAMMON_BG_COLUMN_FROM_RIGHT);
        broadcast_column(gt, col)
    }

    pub fn spheres_mask(&self, resolution: Resolution) -> Result<Mask, EvalError> {
        Ok(self
            .mask(MASK_SPHERE_IN, resolution)?
            .or(&self.mask(MASK_SPHERE_OUT, resolution)?))
    }

    /// Spheres and pyramids of the Pyramids scene.
    pub fn objects_mask(&self, resolution: Resolution) -> Result<Mask, EvalError> {
        Ok(self
            .spheres_mask(resolution)?
            .or(&self.mask(MASK_PYRAMIDS, resolution)?))
    }
}

fn broadcast_column(gt: &ImageF32, col: usize) -> ImageF64 {
    ImageF64::from_fn(gt.w, gt.h, |_, y| gt.get(col, y) as f64)
}
