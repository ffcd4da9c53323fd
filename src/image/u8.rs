//! 8-bit rasters: a borrowed view and the owned label map used for region
//! files whose pixel values carry ids (box grids, dot sizes, vertical bins).
use super::traits::Raster;
use super::Mask;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Non-zero pixels as a boolean mask.
    pub fn to_mask(&self) -> Mask {
        Mask::from_fn(self.w, self.h, |x, y| self.get(x, y) != 0)
    }
}

impl Raster for ImageU8<'_> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

/// Owned label image (one id per pixel, 0 = unlabeled).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl LabelMap {
    pub fn from_vec(w: usize, h: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.h, self.w)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: &self.data,
        }
    }

    /// Pixels carrying exactly `label`.
    pub fn eq_mask(&self, label: u8) -> Mask {
        Mask {
            w: self.w,
            h: self.h,
            data: self.data.iter().map(|&v| v == label).collect(),
        }
    }

    /// Distinct labels present in the map, ascending.
    pub fn unique_labels(&self) -> Vec<u8> {
        self.data
            .iter()
            .copied()
            .collect::<BTreeSet<u8>>()
            .into_iter()
            .collect()
    }
}
