#![forbid(unsafe_code)]

pub mod las;
pub mod pcd;
pub mod ply;

pub use las::read_las;
pub use pcd::{read_pcd, write_pcd, write_pcd_binary};
pub use ply::{read_ply, write_ply, write_ply_binary};

use bevmap_core::PointCloud;
use std::io;
use std::path::Path;

/// Reads a point cloud, choosing the decoder from the file extension.
///
/// Supported: `.pcd`, `.ply`, `.las`, `.laz` (compressed LAS only when the
/// `las` crate was built with LAZ support).
pub fn read_point_cloud(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let cloud = match ext.as_str() {
        "pcd" => read_pcd(path)?,
        "ply" => read_ply(path)?,
        "las" | "laz" => read_las(path)?,
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!(
                    "unsupported point cloud format '{}' for {}",
                    ext,
                    path.display()
                ),
            ));
        }
    };

    log::debug!(
        "read {} points ({}) from {}",
        cloud.len(),
        if cloud.has_colors() { "colored" } else { "uncolored" },
        path.display()
    );
    Ok(cloud)
}
