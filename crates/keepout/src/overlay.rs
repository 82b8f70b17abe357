//! Aligning the bird's-eye view with the occupancy map and compositing the
//! preview.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{KeepoutError, Result};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// How the aligned BEV is placed over the map in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTransform {
    /// Weight of the BEV in the blend, `[0, 1]`
    pub alpha: f32,
    /// Horizontal shift in pixels, `[-1000, 1000]`
    pub x_shift: i32,
    /// Vertical shift in pixels, `[-1000, 1000]`
    pub y_shift: i32,
    /// Clockwise rotation about the image center in degrees, `[-180, 180]`
    pub rotation_deg: f32,
    /// Uniform scale about the image center, `[0, 2]`
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            x_shift: 0,
            y_shift: 0,
            rotation_deg: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub const ALPHA_RANGE: (f32, f32) = (0.0, 1.0);
    pub const SHIFT_RANGE: (i32, i32) = (-1000, 1000);
    pub const ROTATION_RANGE: (f32, f32) = (-180.0, 180.0);
    pub const SCALE_RANGE: (f32, f32) = (0.0, 2.0);

    pub fn validate(&self) -> Result<()> {
        check_range("alpha", self.alpha as f64, Self::ALPHA_RANGE)?;
        check_range("x_shift", self.x_shift as f64, Self::SHIFT_RANGE)?;
        check_range("y_shift", self.y_shift as f64, Self::SHIFT_RANGE)?;
        check_range("rotation_deg", self.rotation_deg as f64, Self::ROTATION_RANGE)?;
        check_range("scale", self.scale as f64, Self::SCALE_RANGE)
    }

    /// Copy with every parameter pulled into its range. NaN falls back to
    /// the default value.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        let clamp_f = |v: f32, (lo, hi): (f32, f32), fallback: f32| {
            if v.is_nan() {
                fallback
            } else {
                v.clamp(lo, hi)
            }
        };
        Self {
            alpha: clamp_f(self.alpha, Self::ALPHA_RANGE, d.alpha),
            x_shift: self.x_shift.clamp(Self::SHIFT_RANGE.0, Self::SHIFT_RANGE.1),
            y_shift: self.y_shift.clamp(Self::SHIFT_RANGE.0, Self::SHIFT_RANGE.1),
            rotation_deg: clamp_f(self.rotation_deg, Self::ROTATION_RANGE, d.rotation_deg),
            scale: clamp_f(self.scale, Self::SCALE_RANGE, d.scale),
        }
    }

    /// Forward 2x3 affine of the rotate-and-scale step for a `width` x
    /// `height` image; `[x', y'] = m * [x, y, 1]`.
    pub fn rotation_matrix(&self, width: u32, height: u32) -> [[f64; 3]; 2] {
        let theta = (-self.rotation_deg as f64).to_radians();
        let scale = self.scale as f64;
        let a = scale * theta.cos();
        let b = scale * theta.sin();
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        [
            [a, b, (1.0 - a) * cx - b * cy],
            [-b, a, b * cx + (1.0 - a) * cy],
        ]
    }
}

fn check_range<T: Into<f64>>(field: &'static str, value: f64, (min, max): (T, T)) -> Result<()> {
    let (min, max) = (min.into(), max.into());
    // NaN fails the comparison
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(KeepoutError::InvalidView {
            field,
            value,
            min,
            max,
        })
    }
}

/// Brings the BEV into the map's frame.
///
/// A BEV whose orientation (landscape or not) differs from the map's is
/// rotated 90° clockwise first. It is then scaled so its height matches the
/// map and pasted at the top-left of a white map-sized canvas; anything past
/// the map's right edge is cut off.
pub fn fit_bev_to_map(bev: &RgbImage, map_width: u32, map_height: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(map_width, map_height, WHITE);
    if bev.width() == 0 || bev.height() == 0 || map_width == 0 || map_height == 0 {
        return canvas;
    }

    let map_landscape = map_width > map_height;
    let bev_landscape = bev.width() > bev.height();
    let oriented = if map_landscape != bev_landscape {
        imageops::rotate90(bev)
    } else {
        bev.clone()
    };

    let scale = map_height as f64 / oriented.height() as f64;
    let width = ((oriented.width() as f64 * scale).round() as u32).max(1);
    let resized = imageops::resize(&oriented, width, map_height, FilterType::Triangle);
    log::debug!(
        "bev {}x{} fitted to {}x{} (scale {:.3})",
        bev.width(),
        bev.height(),
        width,
        map_height,
        scale
    );

    imageops::replace(&mut canvas, &resized, 0, 0);
    canvas
}

/// Applies the view's shift, then its rotation and scale about the center.
///
/// Pixels that map outside the source are black.
pub fn warp(src: &RgbImage, view: &ViewTransform) -> RgbImage {
    let (width, height) = src.dimensions();
    let mut out = RgbImage::new(width, height);

    let [[a, b, tx], [_, _, ty]] = view.rotation_matrix(width, height);
    let det = a * a + b * b;
    if det <= f64::EPSILON || width == 0 || height == 0 {
        return out;
    }
    let (shift_x, shift_y) = (view.x_shift as f64, view.y_shift as f64);
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);
    let in_frame = |x: f64, y: f64| x >= 0.0 && y >= 0.0 && x <= max_x && y <= max_y;

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f64 - tx;
        let dy = y as f64 - ty;
        let qx = (a * dx - b * dy) / det;
        let qy = (b * dx + a * dy) / det;
        // the shifted intermediate is cropped to the frame as well
        if !in_frame(qx, qy) {
            continue;
        }
        let (sx, sy) = (qx - shift_x, qy - shift_y);
        if in_frame(sx, sy) {
            *pixel = sample_bilinear(src, sx, sy);
        }
    }
    out
}

fn sample_bilinear(img: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x1, y0);
    let p01 = img.get_pixel(x0, y1);
    let p11 = img.get_pixel(x1, y1);

    let mut out = [0u8; 3];
    for (c, value) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// `round(alpha * top + (1 - alpha) * bottom)` per channel, then red where
/// `mask` is 255.
pub fn blend(
    top: &RgbImage,
    bottom: &RgbImage,
    alpha: f32,
    mask: &GrayImage,
) -> Result<RgbImage> {
    let inputs = [("warped view", top.dimensions()), ("mask", mask.dimensions())];
    for (what, dims) in inputs {
        if dims != bottom.dimensions() {
            return Err(KeepoutError::DimensionMismatch {
                what,
                expected: bottom.dimensions(),
                actual: dims,
            });
        }
    }

    let alpha = alpha as f64;
    let mut out = RgbImage::new(bottom.width(), bottom.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if mask.get_pixel(x, y).0[0] == 255 {
            *pixel = Rgb([255, 0, 0]);
            continue;
        }
        let t = top.get_pixel(x, y);
        let b = bottom.get_pixel(x, y);
        for c in 0..3 {
            let v = alpha * t[c] as f64 + (1.0 - alpha) * b[c] as f64;
            pixel[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    fn marked(width: u32, height: u32, at: (u32, u32)) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([10, 10, 10]));
        img.put_pixel(at.0, at.1, Rgb([200, 0, 0]));
        img
    }

    fn find_marker(img: &RgbImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [200, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn default_view_is_valid() {
        let view = ViewTransform::default();
        assert!(view.validate().is_ok());
        assert_eq!(view.alpha, 0.5);
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn out_of_range_view_is_rejected() {
        let base = ViewTransform::default();
        let bad = [
            ViewTransform { alpha: 1.5, ..base },
            ViewTransform { x_shift: 1001, ..base },
            ViewTransform { y_shift: -1001, ..base },
            ViewTransform { rotation_deg: 181.0, ..base },
            ViewTransform { scale: f32::NAN, ..base },
        ];
        for view in bad {
            assert!(matches!(
                view.validate(),
                Err(KeepoutError::InvalidView { .. })
            ));
        }
    }

    #[test]
    fn clamped_pulls_into_range() {
        let view = ViewTransform {
            alpha: 2.0,
            x_shift: -5000,
            y_shift: 20,
            rotation_deg: 400.0,
            scale: f32::NAN,
        }
        .clamped();
        assert_eq!(view.alpha, 1.0);
        assert_eq!(view.x_shift, -1000);
        assert_eq!(view.y_shift, 20);
        assert_eq!(view.rotation_deg, 180.0);
        assert_eq!(view.scale, 1.0);
        assert!(view.validate().is_ok());
    }

    #[test]
    fn rotation_matrix_of_quarter_turn() {
        let view = ViewTransform {
            rotation_deg: 90.0,
            scale: 2.0,
            ..Default::default()
        };
        let m = view.rotation_matrix(10, 6);
        assert_relative_eq!(m[0][0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(m[0][1], -2.0, epsilon = 1e-9);
        assert_relative_eq!(m[1][0], 2.0, epsilon = 1e-9);
        // the center is a fixed point
        let (cx, cy) = (5.0, 3.0);
        assert_relative_eq!(m[0][0] * cx + m[0][1] * cy + m[0][2], cx, epsilon = 1e-9);
        assert_relative_eq!(m[1][0] * cx + m[1][1] * cy + m[1][2], cy, epsilon = 1e-9);
    }

    #[test]
    fn identity_view_leaves_image_unchanged() {
        let img = marked(7, 5, (3, 1));
        assert_eq!(warp(&img, &ViewTransform::default()), img);
    }

    #[test]
    fn shift_moves_content_and_exposes_black() {
        let img = marked(6, 4, (0, 0));
        let view = ViewTransform {
            x_shift: 2,
            y_shift: 1,
            ..Default::default()
        };
        let out = warp(&img, &view);
        assert_eq!(find_marker(&out), vec![(2, 1)]);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(1, 3).0, [0, 0, 0]);
    }

    #[test]
    fn positive_rotation_turns_clockwise() {
        // right of center moves below center
        let img = marked(5, 5, (4, 2));
        let view = ViewTransform {
            rotation_deg: 90.0,
            ..Default::default()
        };
        assert_eq!(find_marker(&warp(&img, &view)), vec![(3, 4)]);
    }

    #[test]
    fn zero_scale_is_black() {
        let img = marked(4, 4, (1, 1));
        let view = ViewTransform {
            scale: 0.0,
            ..Default::default()
        };
        assert!(warp(&img, &view).pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn fit_rotates_mismatched_orientation() {
        // portrait BEV onto a landscape map
        let bev = RgbImage::from_pixel(10, 20, Rgb([0, 0, 0]));
        let fitted = fit_bev_to_map(&bev, 40, 20);
        assert_eq!(fitted.dimensions(), (40, 20));
        assert!(fitted.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn fit_pads_with_white_on_the_right() {
        let bev = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let fitted = fit_bev_to_map(&bev, 30, 20);
        assert_eq!(fitted.dimensions(), (30, 20));
        assert_eq!(fitted.get_pixel(19, 19).0, [0, 0, 0]);
        assert_eq!(fitted.get_pixel(20, 0).0, [255, 255, 255]);
        assert_eq!(fitted.get_pixel(29, 19).0, [255, 255, 255]);
    }

    #[test]
    fn fit_crops_wide_bev() {
        let bev = RgbImage::from_pixel(40, 10, Rgb([0, 0, 0]));
        let fitted = fit_bev_to_map(&bev, 30, 20);
        assert_eq!(fitted.dimensions(), (30, 20));
        assert!(fitted.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn blend_extremes_and_mask() {
        let top = RgbImage::from_pixel(3, 3, Rgb([200, 100, 0]));
        let bottom = RgbImage::from_pixel(3, 3, Rgb([0, 100, 200]));
        let mut mask = GrayImage::new(3, 3);

        assert_eq!(blend(&top, &bottom, 1.0, &mask).unwrap(), top);
        assert_eq!(blend(&top, &bottom, 0.0, &mask).unwrap(), bottom);

        mask.put_pixel(1, 1, Luma([255]));
        let half = blend(&top, &bottom, 0.5, &mask).unwrap();
        assert_eq!(half.get_pixel(0, 0).0, [100, 100, 100]);
        assert_eq!(half.get_pixel(1, 1).0, [255, 0, 0]);
    }

    #[test]
    fn blend_rejects_mismatched_sizes() {
        let top = RgbImage::new(3, 3);
        let bottom = RgbImage::new(4, 3);
        let mask = GrayImage::new(4, 3);
        assert!(matches!(
            blend(&top, &bottom, 0.5, &mask),
            Err(KeepoutError::DimensionMismatch { what: "warped view", .. })
        ));
    }
}
