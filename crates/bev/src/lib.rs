//! Bird's-eye-view rasterization of point-cloud maps.
//!
//! The pipeline crops a cloud to a height band, projects it orthographically
//! onto the ground plane and smooths the result with a 3×3 median filter.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod projector;
pub mod smoothing;

pub use config::{BevConfig, CanvasBasis, OutOfRangePolicy};
pub use error::{BevError, Result};
pub use output::{output_path_for, write_png};
pub use pipeline::{generate_birdseye, BevImage, BevStats};
pub use projector::{pointcloud_to_birdseye, Projection, BACKGROUND, UNCOLORED};
pub use smoothing::median_blur_3x3;
