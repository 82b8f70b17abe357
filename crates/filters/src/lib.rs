#![forbid(unsafe_code)]

pub mod crop;

pub use crop::{crop_aabb, crop_height_band, height_band};
