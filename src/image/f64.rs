//! Owned single-channel f64 raster for derived per-pixel quantities
//! (differences, Hessian norms, angular errors, visualizations).
use super::traits::{Raster, RasterMut};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF64 {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: Vec<f64>,
}

impl ImageF64 {
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    pub fn filled(w: usize, h: usize, value: f64) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
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

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.h, self.w)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        let i = y * self.stride + x;
        self.data[i] = v;
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn zip_map(&self, other: &ImageF64, f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(self.shape(), other.shape(), "raster shapes must agree");
        Self {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Narrow to `f32`, e.g. before writing a PFM.
    pub fn to_f32(&self) -> super::ImageF32 {
        super::ImageF32 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self.data.iter().map(|&v| v as f32).collect(),
        }
    }
}

impl Raster for ImageF64 {
    type Pixel = f64;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[f64] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl RasterMut for ImageF64 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f64] {
        let start = y * self.stride;
        &mut self.data[start..start + self.w]
    }
}
