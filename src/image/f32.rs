//! Owned single-channel f32 raster in row-major layout (stride == width).
//!
//! This is the storage type for disparity maps: ground truth, algorithm
//! submissions and meta-algorithm results. Values are kept in the precision
//! of the PFM files they come from; derived per-pixel quantities are computed
//! in `f64` (see [`ImageF64`](super::ImageF64)).
use super::traits::{Raster, RasterMut};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every pixel set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap row-major `data`. Returns `None` when the length does not match.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// `(height, width)`, the order used for every shape check in the crate.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.h, self.w)
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Widen to `f64` for numeric post-processing.
    pub fn to_f64(&self) -> super::ImageF64 {
        super::ImageF64 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self.data.iter().map(|&v| v as f64).collect(),
        }
    }

    /// Return a copy with the row order reversed (PFM stores rows bottom-up).
    pub fn flipped_vertically(&self) -> Self {
        let mut out = Self::new(self.w, self.h);
        for y in 0..self.h {
            let src = &self.data[y * self.stride..y * self.stride + self.w];
            let dst_y = self.h - 1 - y;
            out.data[dst_y * self.w..(dst_y + 1) * self.w].copy_from_slice(src);
        }
        out
    }

    /// Element-wise `f(a, b)` in `f64`. Both images must share a shape.
    pub fn zip_map(&self, other: &ImageF32, f: impl Fn(f64, f64) -> f64) -> super::ImageF64 {
        assert!(self.same_shape(other), "raster shapes must agree");
        super::ImageF64 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a as f64, b as f64))
                .collect(),
        }
    }
}

impl Raster for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl RasterMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        &mut self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_reverses_rows() {
        let img = ImageF32::from_fn(2, 3, |x, y| (y * 10 + x) as f32);
        let flipped = img.flipped_vertically();
        assert_eq!(flipped.get(0, 0), 20.0);
        assert_eq!(flipped.get(1, 2), 1.0);
        assert_eq!(flipped.flipped_vertically(), img);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(ImageF32::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(ImageF32::from_vec(2, 2, vec![0.0; 4]).is_some());
    }
}
