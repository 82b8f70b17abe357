//! Error types for BEV generation

/// Result type alias
pub type Result<T> = std::result::Result<T, BevError>;

#[derive(Debug, thiserror::Error)]
pub enum BevError {
    /// Resolution must be a positive, finite number of meters per pixel
    #[error("invalid resolution {0}: expected a positive number of meters per pixel")]
    InvalidResolution(f64),

    /// Height band with `min_z >= max_z`
    #[error("invalid height band: min_z ({min_z}) must be below max_z ({max_z})")]
    InvalidHeightBand { min_z: f32, max_z: f32 },

    /// Canvas bounds that are not finite
    #[error("invalid canvas bounds: min {min:?}, max {max:?}")]
    InvalidBounds { min: [f32; 3], max: [f32; 3] },

    /// Nothing to derive a region from
    #[error("point cloud contains no finite points")]
    EmptyCloud,

    #[error("canvas of {width}x{height} pixels is too large")]
    CanvasTooLarge { width: u64, height: u64 },

    /// A shifted point fell outside the canvas under the fail policy
    #[error(
        "point {index} maps to pixel (row {row}, col {col}) outside the {width}x{height} canvas"
    )]
    OutOfRange {
        index: usize,
        row: i64,
        col: i64,
        width: u32,
        height: u32,
    },

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
