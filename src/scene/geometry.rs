//! Disparity/depth conversion and surface normals from the scene's pinhole
//! calibration.
//!
//! The pixel-to-millimetre reference is `max(width, height)` of the low-res
//! grid, independent of the resolution a map was evaluated at.
use super::Scene;
use crate::filters::{convolve3x3, transpose, BorderMode, NORMAL_KERNEL};
use crate::image::{ImageF32, ImageF64};
use image::{Rgb, RgbImage};
use nalgebra::Vector3;

/// Per-pixel unit normals in row-major order. Degenerate pixels hold NaN.
#[derive(Clone, Debug)]
pub struct NormalMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<Vector3<f64>>,
}

impl NormalMap {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vector3<f64> {
        self.data[y * self.w + x]
    }

    /// Angle in degrees between corresponding normals of two maps.
    pub fn angular_error(&self, other: &NormalMap) -> ImageF64 {
        assert_eq!((self.w, self.h), (other.w, other.h), "normal map shapes must agree");
        ImageF64 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
                .collect(),
        }
    }

    /// `(n + 1) / 2` per component.
    pub fn visualization(&self) -> NormalMap {
        NormalMap {
            w: self.w,
            h: self.h,
            data: self
                .data
                .iter()
                .map(|n| n.map(|c| (c + 1.0) * 0.5))
                .collect(),
        }
    }

    /// Render a `[0, 1]` valued map (see [`NormalMap::visualization`]) as RGB.
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.w as u32, self.h as u32, |x, y| {
            let n = self.get(x as usize, y as usize);
            let channel = |c: f64| {
                if c.is_finite() {
                    (c * 255.0).round().clamp(0.0, 255.0) as u8
                } else {
                    0
                }
            };
            Rgb([channel(n.x), channel(n.y), channel(n.z)])
        })
    }
}

impl Scene {
    fn max_res(&self) -> f64 {
        self.params.width.max(self.params.height) as f64
    }

    /// Depth in metres.
    pub fn disp_to_depth(&self, disp: &ImageF32) -> ImageF64 {
        let p = &self.params;
        let q = p.baseline_mm * p.focal_length_mm * self.max_res();
        let inv_focus = 1.0 / p.focus_distance_m;
        let factor = 1000.0 * p.sensor_size_mm;
        disp.to_f64().map(|d| 1.0 / (factor * d / q + inv_focus))
    }

    /// Inverse of [`Scene::disp_to_depth`].
    pub fn depth_to_disp(&self, depth: &ImageF64) -> ImageF64 {
        let p = &self.params;
        let f = (p.baseline_mm / 1000.0) * p.focal_length_mm * self.max_res();
        let focus = p.focus_distance_m;
        depth.map(|z| (f * focus / z - f) / focus / p.sensor_size_mm)
    }

    /// Disparity offset of the focal plane.
    pub fn compute_offset(&self) -> f64 {
        let p = &self.params;
        p.baseline_mm * p.focal_length_mm / p.focus_distance_m / 1000.0 / p.sensor_size_mm
            * self.max_res()
    }

    /// Surface normals of a depth map via re-projected point coordinates.
    pub fn depth_normals(&self, depth: &ImageF64) -> NormalMap {
        depth_normals(depth, self.params.sensor_size_mm, self.params.focal_length_mm)
    }

    pub fn normal_vis(&self, disp: &ImageF32) -> NormalMap {
        self.depth_normals(&self.disp_to_depth(disp)).visualization()
    }
}

pub fn depth_normals(depth: &ImageF64, sensor_mm: f64, focal_mm: f64) -> NormalMap {
    let (w, h) = (depth.w, depth.h);
    let norm_x = if w > 1 { (w - 1) as f64 } else { 1.0 };
    let norm_y = if h > 1 { (h - 1) as f64 } else { 1.0 };
    let xx = ImageF64::from_fn(w, h, |c, r| {
        (c as f64 / norm_x * 0.5) * sensor_mm * depth.get(c, r) / focal_mm
    });
    let yy = ImageF64::from_fn(w, h, |c, r| {
        (r as f64 / norm_y * 0.5) * sensor_mm * depth.get(c, r) / focal_mm
    });

    let k = NORMAL_KERNEL;
    let kt = transpose(&NORMAL_KERNEL);
    let wrap = BorderMode::Wrap;
    let dxdx = convolve3x3(&xx, &k, wrap);
    let dydx = convolve3x3(&yy, &k, wrap);
    let dzdx = convolve3x3(depth, &k, wrap);
    let dxdy = convolve3x3(&xx, &kt, wrap);
    let dydy = convolve3x3(&yy, &kt, wrap);
    let dzdy = convolve3x3(depth, &kt, wrap);

    let data = (0..w * h)
        .map(|i| {
            let n = Vector3::new(
                dzdx.data[i] * dxdy.data[i] - dxdx.data[i] * dzdy.data[i],
                -(dydx.data[i] * dzdy.data[i] - dzdx.data[i] * dydy.data[i]),
                -(dxdx.data[i] * dydy.data[i] - dydx.data[i] * dxdy.data[i]),
            );
            // zero magnitude yields NaN, excluded later as invalid
            n / n.norm()
        })
        .collect();

    NormalMap { w, h, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fronto_parallel_plane_faces_the_camera() {
        let depth = ImageF64::filled(9, 9, 2.0);
        let normals = depth_normals(&depth, 36.0, 100.0);
        let n = normals.get(4, 4);
        assert!(n.x.abs() < 1e-12 && n.y.abs() < 1e-12, "n={n:?}");
        assert!((n.z.abs() - 1.0).abs() < 1e-12);

        let err = normals.angular_error(&normals);
        assert!(err.get(4, 4).abs() < 1e-6);
    }

    #[test]
    fn disparity_depth_conversion_round_trips() {
        let scene = Scene::in_memory(9, 7);
        let disp = ImageF32::from_fn(9, 7, |x, y| 0.05 * x as f32 + 0.01 * y as f32);
        let depth = scene.disp_to_depth(&disp);

        // 1 / (1000 * sensor * d / (baseline * focal * max_res) + 1 / focus)
        let d = disp.get(3, 2) as f64;
        let expected = 1.0 / (1000.0 * 35.0 * d / (90.0 * 100.0 * 9.0) + 1.0 / 8.0);
        assert!((depth.get(3, 2) - expected).abs() < 1e-12, "{}", depth.get(3, 2));
        assert!((depth.get(0, 0) - 8.0).abs() < 1e-12);

        let back = scene.depth_to_disp(&depth);
        for y in 0..7 {
            for x in 0..9 {
                assert!((back.get(x, y) - disp.get(x, y) as f64).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn offset_is_the_disparity_at_infinity() {
        let scene = Scene::in_memory(9, 9);
        let far = scene.depth_to_disp(&ImageF64::filled(1, 1, f64::INFINITY));
        assert!((far.get(0, 0) + scene.compute_offset()).abs() < 1e-12);
        assert!((scene.compute_offset() - 90.0 * 100.0 / 8.0 / 1000.0 / 35.0 * 9.0).abs() < 1e-12);
    }

    #[test]
    fn plane_tilted_by_45_degrees() {
        let (w, h, sensor, focal, z0) = (9, 9, 35.0, 100.0, 2.0);
        let u = |c: usize| c as f64 / (w - 1) as f64 * 0.5 * sensor / focal;
        // world plane Z = z0 + X with X = u(c) * Z
        let tilted = ImageF64::from_fn(w, h, |c, _| z0 / (1.0 - u(c)));
        let fronto = ImageF64::filled(w, h, z0);
        let err = depth_normals(&tilted, sensor, focal)
            .angular_error(&depth_normals(&fronto, sensor, focal));
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                assert!((err.get(x, y) - 45.0).abs() < 1e-6, "({x}, {y}): {}", err.get(x, y));
            }
        }
    }

    #[test]
    fn normal_visualization_is_in_unit_range() {
        let scene = Scene::in_memory(5, 5);
        let vis = scene.normal_vis(&ImageF32::filled(5, 5, 0.2));
        let n = vis.get(2, 2);
        assert!((n.x - 0.5).abs() < 1e-12 && (n.y - 0.5).abs() < 1e-12);
        assert!(n.z.abs() < 1e-12 || (n.z - 1.0).abs() < 1e-12);
        assert_eq!(vis.to_rgb().dimensions(), (5, 5));
    }

    #[test]
    fn flat_zero_depth_has_no_normal() {
        let depth = ImageF64::filled(4, 4, 0.0);
        let normals = depth_normals(&depth, 36.0, 100.0);
        assert!(normals.get(1, 1).x.is_nan());
    }
}
