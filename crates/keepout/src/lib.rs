//! Keepout-zone map baking.
//!
//! Aligns a bird's-eye-view raster with an occupancy map, composites a
//! preview, and rasterizes hand-drawn polygons into the map as occupied
//! (value 0) cells. Editing is driven by [`EditEvent`]s, either one at a time
//! or replayed from a [`KeepoutPlan`].

#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod map;
pub mod overlay;
pub mod plan;
pub mod session;

pub use error::{KeepoutError, Result};
pub use geometry::Vertex;
pub use map::{keepout_path_for, load_bev, load_map, preview_path_for, save_pgm, save_png};
pub use overlay::{blend, fit_bev_to_map, warp, ViewTransform};
pub use plan::KeepoutPlan;
pub use session::{EditEvent, EditSession, MASK_ON, VERTEX_RADIUS};
