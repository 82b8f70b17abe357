//! Error types for keepout map editing

pub type Result<T> = std::result::Result<T, KeepoutError>;

#[derive(Debug, thiserror::Error)]
pub enum KeepoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid keepout plan: {0}")]
    Plan(#[from] serde_yaml::Error),

    /// Background and keepout map must cover the same grid
    #[error("{what} is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("view parameter {field} = {value} is outside [{min}, {max}]")]
    InvalidView {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
