//! Resampling between the low- and high-resolution grids of a scene.
//!
//! Output pixel `o` samples the input at `o·(n_in−1)/(n_out−1)`, so the
//! first and last samples of both grids coincide. `Nearest` takes
//! `⌊c + 0.5⌋`; `Linear` blends the two neighbouring samples per axis.
use super::{ImageF32, ImageF64, LabelMap, Mask};
use image::RgbImage;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Nearest,
    Linear,
}

/// Input coordinate for every output index along one axis.
fn axis_coords(n_in: usize, n_out: usize) -> Vec<f64> {
    if n_out <= 1 || n_in <= 1 {
        return vec![0.0; n_out];
    }
    let step = (n_in - 1) as f64 / (n_out - 1) as f64;
    (0..n_out).map(|o| o as f64 * step).collect()
}

fn nearest_indices(n_in: usize, n_out: usize) -> Vec<usize> {
    axis_coords(n_in, n_out)
        .into_iter()
        .map(|c| ((c + 0.5).floor() as usize).min(n_in.saturating_sub(1)))
        .collect()
}

fn resize_nearest<T: Copy>(
    src: &[T],
    w_in: usize,
    h_in: usize,
    w_out: usize,
    h_out: usize,
) -> Vec<T> {
    let xs = nearest_indices(w_in, w_out);
    let ys = nearest_indices(h_in, h_out);
    let mut out = Vec::with_capacity(w_out * h_out);
    for &sy in &ys {
        let row = &src[sy * w_in..(sy + 1) * w_in];
        out.extend(xs.iter().map(|&sx| row[sx]));
    }
    out
}

fn resize_linear(src: &[f64], w_in: usize, h_in: usize, w_out: usize, h_out: usize) -> Vec<f64> {
    let split = |n_in: usize, n_out: usize| -> Vec<(usize, usize, f64)> {
        axis_coords(n_in, n_out)
            .into_iter()
            .map(|c| {
                let i0 = (c.floor() as usize).min(n_in.saturating_sub(1));
                let i1 = (i0 + 1).min(n_in.saturating_sub(1));
                (i0, i1, c - i0 as f64)
            })
            .collect()
    };
    let xs = split(w_in, w_out);
    let ys = split(h_in, h_out);

    let mut out = Vec::with_capacity(w_out * h_out);
    for &(y0, y1, fy) in &ys {
        let r0 = &src[y0 * w_in..(y0 + 1) * w_in];
        let r1 = &src[y1 * w_in..(y1 + 1) * w_in];
        for &(x0, x1, fx) in &xs {
            let top = lerp(r0[x0], r0[x1], fx);
            let bottom = lerp(r1[x0], r1[x1], fx);
            out.push(lerp(top, bottom, fy));
        }
    }
    out
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 {
        a
    } else {
        a + (b - a) * t
    }
}

/// Output length when zooming `n` samples by `factor`.
#[inline]
pub fn zoomed_len(n: usize, factor: f64) -> usize {
    (n as f64 * factor).round() as usize
}

pub fn resize_f32(img: &ImageF32, w_out: usize, h_out: usize, order: Interpolation) -> ImageF32 {
    let data = match order {
        Interpolation::Nearest => resize_nearest(&img.data, img.w, img.h, w_out, h_out),
        Interpolation::Linear => {
            let wide: Vec<f64> = img.data.iter().map(|&v| v as f64).collect();
            resize_linear(&wide, img.w, img.h, w_out, h_out)
                .into_iter()
                .map(|v| v as f32)
                .collect()
        }
    };
    ImageF32 {
        w: w_out,
        h: h_out,
        stride: w_out,
        data,
    }
}

pub fn resize_f64(img: &ImageF64, w_out: usize, h_out: usize, order: Interpolation) -> ImageF64 {
    let data = match order {
        Interpolation::Nearest => resize_nearest(&img.data, img.w, img.h, w_out, h_out),
        Interpolation::Linear => resize_linear(&img.data, img.w, img.h, w_out, h_out),
    };
    ImageF64 {
        w: w_out,
        h: h_out,
        stride: w_out,
        data,
    }
}

/// Scale both axes by `factor` (e.g. a low-res submission onto the high-res grid).
pub fn zoom_f32(img: &ImageF32, factor: f64, order: Interpolation) -> ImageF32 {
    resize_f32(
        img,
        zoomed_len(img.w, factor),
        zoomed_len(img.h, factor),
        order,
    )
}

pub fn resize_mask(mask: &Mask, w_out: usize, h_out: usize) -> Mask {
    Mask {
        w: w_out,
        h: h_out,
        data: resize_nearest(&mask.data, mask.w, mask.h, w_out, h_out),
    }
}

pub fn resize_labels(labels: &LabelMap, w_out: usize, h_out: usize) -> LabelMap {
    LabelMap {
        w: w_out,
        h: h_out,
        data: resize_nearest(&labels.data, labels.w, labels.h, w_out, h_out),
    }
}

pub fn resize_rgb(img: &RgbImage, w_out: usize, h_out: usize) -> RgbImage {
    let (w_in, h_in) = (img.width() as usize, img.height() as usize);
    let xs = nearest_indices(w_in, w_out);
    let ys = nearest_indices(h_in, h_out);
    RgbImage::from_fn(w_out as u32, h_out as u32, |x, y| {
        *img.get_pixel(xs[x as usize] as u32, ys[y as usize] as u32)
    })
}

/// Coarsen a visualization into blocks of roughly `1/factor` pixels and
/// blow it back up to the original shape (nearest neighbour both ways).
pub fn pixelize(img: &ImageF64, factor: f64) -> ImageF64 {
    let block = (1.0 / factor).round().max(1.0) as usize;
    let small_w = zoomed_len(img.w, factor).max(1);
    let small_h = zoomed_len(img.h, factor).max(1);
    let small = resize_f64(img, small_w, small_h, Interpolation::Nearest);

    let factor_w = img.w as f64 / (img.w / block).max(1) as f64;
    let factor_h = img.h as f64 / (img.h / block).max(1) as f64;
    let out_w = zoomed_len(small.w, factor_w);
    let out_h = zoomed_len(small.h, factor_h);
    resize_f64(&small, out_w, out_h, Interpolation::Nearest)
}
