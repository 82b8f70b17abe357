//! Speckle suppression for sparse projections.

use image::{Rgb, RgbImage};

/// 3×3 median filter applied to each channel independently.
///
/// Border pixels see their edge neighbours replicated, so the output has the
/// same size as the input and a uniform image is left unchanged.
pub fn median_blur_3x3(src: &RgbImage) -> RgbImage {
    let (width, height) = src.dimensions();
    let mut out = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let clamp = |v: i64, hi: u32| v.clamp(0, hi as i64 - 1) as u32;
    let mut window = [[0u8; 9]; 3];

    for y in 0..height {
        for x in 0..width {
            let mut k = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = clamp(x as i64 + dx, width);
                    let sy = clamp(y as i64 + dy, height);
                    let p = src.get_pixel(sx, sy);
                    for c in 0..3 {
                        window[c][k] = p[c];
                    }
                    k += 1;
                }
            }

            let mut median = [0u8; 3];
            for (c, values) in window.iter_mut().enumerate() {
                let (_, m, _) = values.select_nth_unstable(4);
                median[c] = *m;
            }
            out.put_pixel(x, y, Rgb(median));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn removes_isolated_speckle() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([255, 255, 255]));
        img.put_pixel(2, 2, Rgb([0, 0, 0]));
        let out = median_blur_3x3(&img);
        assert!(out.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn keeps_solid_block() {
        let mut img = RgbImage::from_pixel(6, 6, Rgb([255, 255, 255]));
        for y in 1..5 {
            for x in 1..5 {
                img.put_pixel(x, y, Rgb([10, 20, 30]));
            }
        }
        let out = median_blur_3x3(&img);
        assert_eq!(*out.get_pixel(2, 2), Rgb([10, 20, 30]));
        assert_eq!(*out.get_pixel(3, 3), Rgb([10, 20, 30]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn channels_are_filtered_independently() {
        let mut img = RgbImage::from_pixel(3, 3, Rgb([0, 100, 200]));
        img.put_pixel(1, 1, Rgb([255, 0, 0]));
        let out = median_blur_3x3(&img);
        assert_eq!(*out.get_pixel(1, 1), Rgb([0, 100, 200]));
    }

    #[test]
    fn replicated_border_keeps_corner_line() {
        // A full first row survives: at the border the row is counted twice.
        let mut img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        for x in 0..4 {
            img.put_pixel(x, 0, Rgb([0, 0, 0]));
        }
        let out = median_blur_3x3(&img);
        for x in 0..4 {
            assert_eq!(*out.get_pixel(x, 0), Rgb([0, 0, 0]));
            assert_eq!(*out.get_pixel(x, 1), Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn single_pixel_image() {
        let img = RgbImage::from_pixel(1, 1, Rgb([1, 2, 3]));
        assert_eq!(median_blur_3x3(&img), img);
    }

    proptest! {
        #[test]
        fn uniform_image_is_fixed_point(w in 1u32..20, h in 1u32..20, c in any::<[u8; 3]>()) {
            let img = RgbImage::from_pixel(w, h, Rgb(c));
            prop_assert_eq!(median_blur_3x3(&img), img);
        }
    }
}
