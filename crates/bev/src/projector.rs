//! Orthographic top-down projection of a point cloud onto a color raster.
//!
//! World X grows to the right (columns), world Y grows upwards (rows are
//! flipped). Cells are `floor(coord / resolution)`; both axes are shifted so
//! the smallest occupied cell becomes index 0.

use bevmap_core::PointCloud;
use image::{Rgb, RgbImage};

use crate::config::{validate_resolution, BevConfig, CanvasBasis, OutOfRangePolicy};
use crate::error::{BevError, Result};

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Color used for points of a cloud that carries no colors.
pub const UNCOLORED: Rgb<u8> = Rgb([0, 0, 0]);

/// Canvas size limit, in pixels.
const MAX_CANVAS_PIXELS: u64 = u32::MAX as u64;

#[derive(Debug, Clone)]
pub struct Projection {
    pub image: RgbImage,
    /// Points that fell outside the canvas and were skipped.
    pub clipped: usize,
}

/// Projects `cloud` into a top-down RGB raster.
///
/// Only the X/Y components of `min_bound` / `max_bound` are used, and only
/// with [`CanvasBasis::Nominal`], where they size the canvas as
/// `1 + floor(extent / resolution)` per axis. Overlapping points resolve by
/// input order: the last one written wins. Points with a non-finite X or Y
/// are ignored.
pub fn pointcloud_to_birdseye(
    cloud: &PointCloud,
    min_bound: [f32; 3],
    max_bound: [f32; 3],
    config: &BevConfig,
) -> Result<Projection> {
    let resolution = config.resolution;
    validate_resolution(resolution)?;

    let cells: Vec<(usize, i64, i64)> = cloud
        .x
        .iter()
        .zip(&cloud.y)
        .enumerate()
        .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
        .map(|(i, (&x, &y))| {
            let col = (x as f64 / resolution).floor() as i64;
            let row = (-(y as f64) / resolution).floor() as i64;
            (i, col, row)
        })
        .collect();

    let min_col = cells.iter().map(|c| c.1).min().unwrap_or(0);
    let min_row = cells.iter().map(|c| c.2).min().unwrap_or(0);

    let (width, height) = match config.canvas_basis {
        CanvasBasis::Observed if !cells.is_empty() => {
            let max_col = cells.iter().map(|c| c.1).max().unwrap_or(0);
            let max_row = cells.iter().map(|c| c.2).max().unwrap_or(0);
            checked_canvas(
                max_col.saturating_sub(min_col) as u64 + 1,
                max_row.saturating_sub(min_row) as u64 + 1,
            )?
        }
        _ => nominal_canvas(min_bound, max_bound, resolution)?,
    };

    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let mut clipped = 0usize;

    for &(index, col, row) in &cells {
        let col = col.saturating_sub(min_col);
        let row = row.saturating_sub(min_row);

        if col < width as i64 && row < height as i64 {
            let color = cloud.color(index).map(Rgb).unwrap_or(UNCOLORED);
            image.put_pixel(col as u32, row as u32, color);
            continue;
        }

        match config.out_of_range {
            OutOfRangePolicy::Clip => clipped += 1,
            OutOfRangePolicy::Fail => {
                return Err(BevError::OutOfRange {
                    index,
                    row,
                    col,
                    width,
                    height,
                });
            }
        }
    }

    if clipped > 0 {
        log::warn!(
            "{} of {} points fell outside the {}x{} canvas and were skipped",
            clipped,
            cells.len(),
            width,
            height
        );
    }

    Ok(Projection { image, clipped })
}

/// `1 + floor((max - min) / resolution)` on X and Y.
///
/// Inverted extents collapse to a single pixel instead of an empty image.
fn nominal_canvas(min: [f32; 3], max: [f32; 3], resolution: f64) -> Result<(u32, u32)> {
    if !(min[0].is_finite() && min[1].is_finite() && max[0].is_finite() && max[1].is_finite()) {
        return Err(BevError::InvalidBounds { min, max });
    }

    let dim = |lo: f32, hi: f32| -> u64 {
        let cells = ((hi as f64 - lo as f64) / resolution).floor();
        if cells <= 0.0 {
            1
        } else if cells >= u64::MAX as f64 {
            u64::MAX
        } else {
            cells as u64 + 1
        }
    };

    checked_canvas(dim(min[0], max[0]), dim(min[1], max[1]))
}

fn checked_canvas(width: u64, height: u64) -> Result<(u32, u32)> {
    let fits = width
        .checked_mul(height)
        .is_some_and(|pixels| pixels <= MAX_CANVAS_PIXELS);
    if !fits || width > u32::MAX as u64 || height > u32::MAX as u64 {
        return Err(BevError::CanvasTooLarge { width, height });
    }
    Ok((width as u32, height as u32))
}
