//! Boolean region masks.
//!
//! Every evaluation region (boundary margin, semantic region files, validity
//! of per-pixel quantities) is a `Mask` of the scene's shape at the current
//! resolution. Combination is plain set algebra; shapes must agree, which the
//! scene loaders guarantee before any mask reaches a metric.
use super::{ImageF32, ImageF64};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<bool>,
}

impl Mask {
    /// All-false mask.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, false)
    }

    pub fn filled(w: usize, h: usize, value: bool) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self { w, h, data }
    }

    /// True where `img` holds a finite value (not NaN, not ±inf).
    pub fn finite_f32(img: &ImageF32) -> Self {
        Self {
            w: img.w,
            h: img.h,
            data: img.data.iter().map(|v| v.is_finite()).collect(),
        }
    }

    pub fn finite_f64(img: &ImageF64) -> Self {
        Self {
            w: img.w,
            h: img.h,
            data: img.data.iter().map(|v| v.is_finite()).collect(),
        }
    }

    /// Threshold a per-pixel predicate over an `f64` raster.
    pub fn from_predicate(img: &ImageF64, pred: impl Fn(f64) -> bool) -> Self {
        Self {
            w: img.w,
            h: img.h,
            data: img.data.iter().map(|&v| pred(v)).collect(),
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.h, self.w)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        let i = y * self.w + x;
        self.data[i] = v;
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn and(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a && b)
    }

    pub fn or(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a || b)
    }

    pub fn not(&self) -> Mask {
        Mask {
            w: self.w,
            h: self.h,
            data: self.data.iter().map(|v| !v).collect(),
        }
    }

    /// In-place intersection.
    pub fn and_assign(&mut self, other: &Mask) {
        assert_eq!(self.shape(), other.shape(), "mask shapes must agree");
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = *a && b;
        }
    }

    fn combine(&self, other: &Mask, op: impl Fn(bool, bool) -> bool) -> Mask {
        assert_eq!(self.shape(), other.shape(), "mask shapes must agree");
        Mask {
            w: self.w,
            h: self.h,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }

    /// Values of `img` at selected pixels, in row-major order.
    pub fn select(&self, img: &ImageF64) -> Vec<f64> {
        assert_eq!(self.shape(), img.shape(), "mask and raster shapes must agree");
        self.data
            .iter()
            .zip(img.data.iter())
            .filter_map(|(&m, &v)| m.then_some(v))
            .collect()
    }

    /// Number of pixels selected by both `self` and `other`.
    pub fn count_and(&self, other: &Mask) -> usize {
        assert_eq!(self.shape(), other.shape(), "mask shapes must agree");
        self.data
            .iter()
            .zip(other.data.iter())
            .filter(|(&a, &b)| a && b)
            .count()
    }

    /// `1.0` where set, `0.2` elsewhere; the rendering used for binary
    /// error maps.
    pub fn to_binary_vis(&self) -> ImageF64 {
        ImageF64 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self
                .data
                .iter()
                .map(|&v| if v { 1.0 } else { 0.2 })
                .collect(),
        }
    }
}
