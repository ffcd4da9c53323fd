//! Scharr derivative filters and the second-order smoothness measure built
//! on them.
//!
//! `scharr_h` responds to horizontal edges (derivative along y), `scharr_v`
//! to vertical edges (derivative along x). Both use reflect borders and zero
//! the outermost pixel ring afterwards.
use super::conv::{convolve3x3, transpose, zero_border, BorderMode, Kernel3};
use crate::image::ImageF64;

pub const HSCHARR: Kernel3 = [
    [3.0 / 16.0, 10.0 / 16.0, 3.0 / 16.0],
    [0.0, 0.0, 0.0],
    [-3.0 / 16.0, -10.0 / 16.0, -3.0 / 16.0],
];

/// Kernel for surface-normal estimation; applied with wrap borders.
pub const NORMAL_KERNEL: Kernel3 = [
    [3.0 / 64.0, 10.0 / 64.0, 3.0 / 64.0],
    [0.0, 0.0, 0.0],
    [-3.0 / 64.0, -10.0 / 64.0, -3.0 / 64.0],
];

pub fn scharr_h(img: &ImageF64) -> ImageF64 {
    let mut out = convolve3x3(img, &HSCHARR, BorderMode::Reflect);
    zero_border(&mut out);
    out
}

pub fn scharr_v(img: &ImageF64) -> ImageF64 {
    let mut out = convolve3x3(img, &transpose(&HSCHARR), BorderMode::Reflect);
    zero_border(&mut out);
    out
}

/// Frobenius norm of the discrete Hessian of `diff`, clipped to `[0, clip]`.
pub fn hessian_norm(diff: &ImageF64, clip: f64) -> ImageF64 {
    let dx = scharr_v(diff);
    let dy = scharr_h(diff);
    let dxx = scharr_v(&dx);
    let dxy = scharr_h(&dx);
    let dyy = scharr_h(&dy);
    let dyx = scharr_v(&dy);

    let mut out = ImageF64::new(diff.w, diff.h);
    for (i, v) in out.data.iter_mut().enumerate() {
        let n = (dxx.data[i].powi(2)
            + dxy.data[i].powi(2)
            + dyy.data[i].powi(2)
            + dyx.data[i].powi(2))
        .sqrt();
        // NaN survives clamp and is filtered by the validity mask
        *v = n.clamp(0.0, clip);
    }
    out
}
