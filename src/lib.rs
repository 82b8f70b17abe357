//! Point-cloud maps to bird's-eye-view images, and keepout-zone maps for
//! Nav2 baked from them.
//!
//! This crate re-exports the workspace members:
//!
//! - [`cloud`]: point cloud and bounding box types
//! - [`io`]: PCD, PLY and LAS readers
//! - [`filters`]: box and height-band cropping
//! - [`bev`]: top-down projection, smoothing and PNG output
//! - [`keepout`]: overlay alignment, edit sessions and PGM output

#![forbid(unsafe_code)]

pub use bevmap_bev as bev;
pub use bevmap_core as cloud;
pub use bevmap_filters as filters;
pub use bevmap_io as io;
pub use bevmap_keepout as keepout;

pub use bevmap_bev::{generate_birdseye, BevConfig, BevError};
pub use bevmap_core::PointCloud;
pub use bevmap_io::read_point_cloud;
pub use bevmap_keepout::{EditEvent, EditSession, KeepoutError, KeepoutPlan};
