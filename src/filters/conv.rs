//! 3×3 convolution with selectable border handling.
//!
//! This is a true convolution (kernel flipped in both axes):
//! `out[y][x] = Σ k[m][n] · in[y+1−m][x+1−n]`. Both border modes only ever
//! reach one pixel past the edge.
//!
//! - `Reflect` repeats the edge sample (`d c b a | a b c d`), which for a
//!   one-pixel reach equals clamping.
//! - `Wrap` continues periodically from the opposite edge.
use crate::image::{ImageF64, Raster, RasterMut};

pub type Kernel3 = [[f64; 3]; 3];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    Reflect,
    Wrap,
}

#[inline]
fn neighbours(i: usize, n: usize, border: BorderMode) -> [usize; 3] {
    // order matches kernel index 0, 1, 2 under the flip: i+1, i, i-1
    match border {
        BorderMode::Reflect => [(i + 1).min(n - 1), i, i.saturating_sub(1)],
        BorderMode::Wrap => [(i + 1) % n, i, (i + n - 1) % n],
    }
}

/// Convolve `img` with a 3×3 kernel.
pub fn convolve3x3(img: &ImageF64, kernel: &Kernel3, border: BorderMode) -> ImageF64 {
    let w = img.w;
    let h = img.h;
    let mut out = ImageF64::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    for y in 0..h {
        let y_idx = neighbours(y, h, border);
        let rows = [img.row(y_idx[0]), img.row(y_idx[1]), img.row(y_idx[2])];
        let out_row = out.row_mut(y);
        for (x, out_px) in out_row.iter_mut().enumerate() {
            let x_idx = neighbours(x, w, border);
            let mut sum = 0.0;
            for (k_row, src_row) in kernel.iter().zip(rows.iter()) {
                sum += k_row[0] * src_row[x_idx[0]]
                    + k_row[1] * src_row[x_idx[1]]
                    + k_row[2] * src_row[x_idx[2]];
            }
            *out_px = sum;
        }
    }
    out
}

pub fn transpose(kernel: &Kernel3) -> Kernel3 {
    let mut t = [[0.0; 3]; 3];
    for (r, row) in kernel.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            t[c][r] = v;
        }
    }
    t
}

/// Set the outermost one-pixel ring to zero.
pub fn zero_border(img: &mut ImageF64) {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        img.set(x, 0, 0.0);
        img.set(x, h - 1, 0.0);
    }
    for y in 0..h {
        img.set(0, y, 0.0);
        img.set(w - 1, y, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT_RIGHT: Kernel3 = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]];

    #[test]
    fn convolution_flips_the_kernel() {
        // k[1][2] picks in[y][x-1]: content moves one pixel to the right
        let img = ImageF64::from_fn(4, 1, |x, _| x as f64);
        let out = convolve3x3(&img, &SHIFT_RIGHT, BorderMode::Wrap);
        assert_eq!(out.data, vec![3.0, 0.0, 1.0, 2.0]);
        let out = convolve3x3(&img, &SHIFT_RIGHT, BorderMode::Reflect);
        assert_eq!(out.data, vec![0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn transpose_swaps_axes() {
        let k = [[1.0, 2.0, 3.0], [0.0; 3], [0.0; 3]];
        let t = transpose(&k);
        assert_eq!(t[2][0], 3.0);
        assert_eq!(transpose(&t), k);
    }
}
