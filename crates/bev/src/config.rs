//! Projection settings.

use serde::{Deserialize, Serialize};

use crate::error::{BevError, Result};

/// Ground-plane size of one pixel, in meters.
pub const DEFAULT_RESOLUTION: f64 = 0.05;
pub const DEFAULT_MIN_Z: f32 = -2.0;
pub const DEFAULT_MAX_Z: f32 = 2.0;

/// How the canvas size is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasBasis {
    /// Size from the region's X/Y extent while points are placed relative to
    /// their own minimum cell. Matches images produced by earlier versions
    /// of the tool pixel for pixel.
    #[default]
    Nominal,
    /// Size from the extent of the projected points themselves, so every
    /// point lands on the canvas.
    Observed,
}

/// What to do with a point whose shifted cell lies outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Skip the write and report the number of skipped points.
    #[default]
    Clip,
    /// Abort with [`BevError::OutOfRange`].
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BevConfig {
    /// Meters per pixel
    pub resolution: f64,
    /// Lower edge of the height band (meters, inclusive)
    pub min_z: f32,
    /// Upper edge of the height band (meters, inclusive)
    pub max_z: f32,
    pub canvas_basis: CanvasBasis,
    pub out_of_range: OutOfRangePolicy,
    /// Apply the 3×3 median filter to the finished raster
    pub median_filter: bool,
}

impl Default for BevConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            min_z: DEFAULT_MIN_Z,
            max_z: DEFAULT_MAX_Z,
            canvas_basis: CanvasBasis::Nominal,
            out_of_range: OutOfRangePolicy::Clip,
            median_filter: true,
        }
    }
}

impl BevConfig {
    pub fn validate(&self) -> Result<()> {
        validate_resolution(self.resolution)?;
        if !(self.min_z < self.max_z) {
            return Err(BevError::InvalidHeightBand {
                min_z: self.min_z,
                max_z: self.max_z,
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_resolution(resolution: f64) -> Result<()> {
    if resolution.is_finite() && resolution > 0.0 {
        Ok(())
    } else {
        Err(BevError::InvalidResolution(resolution))
    }
}
