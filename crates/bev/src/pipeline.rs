//! Height-band crop, projection and smoothing in one call.

use bevmap_core::PointCloud;
use bevmap_filters::{crop_aabb, height_band};
use image::RgbImage;

use crate::config::BevConfig;
use crate::error::{BevError, Result};
use crate::projector::pointcloud_to_birdseye;
use crate::smoothing::median_blur_3x3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BevStats {
    pub input_points: usize,
    /// Points left after the height-band crop
    pub kept_points: usize,
    /// Points that fell outside the canvas
    pub clipped_points: usize,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct BevImage {
    pub image: RgbImage,
    pub stats: BevStats,
}

/// Builds the bird's-eye view of `cloud`.
///
/// The region is the cloud's own X/Y extent with Z replaced by
/// `[config.min_z, config.max_z]`; the canvas is sized from that region.
pub fn generate_birdseye(cloud: &PointCloud, config: &BevConfig) -> Result<BevImage> {
    config.validate()?;

    let region = height_band(cloud, config.min_z, config.max_z);
    if region.is_empty() {
        return Err(BevError::EmptyCloud);
    }

    let cropped = crop_aabb(cloud, &region);
    log::debug!(
        "height band [{}, {}] kept {} of {} points",
        config.min_z,
        config.max_z,
        cropped.len(),
        cloud.len()
    );

    let projection = pointcloud_to_birdseye(&cropped, region.min, region.max, config)?;
    let image = if config.median_filter {
        median_blur_3x3(&projection.image)
    } else {
        projection.image
    };

    let stats = BevStats {
        input_points: cloud.len(),
        kept_points: cropped.len(),
        clipped_points: projection.clipped,
        width: image.width(),
        height: image.height(),
    };
    log::info!(
        "bird's-eye view {}x{} px at {} m/px from {} of {} points",
        stats.width,
        stats.height,
        config.resolution,
        stats.kept_points,
        stats.input_points
    );

    Ok(BevImage { image, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::BACKGROUND;
    use bevmap_core::PointXYZRGB;

    fn raw_config(resolution: f64) -> BevConfig {
        BevConfig {
            resolution,
            median_filter: false,
            ..Default::default()
        }
    }

    #[test]
    fn crops_then_projects() {
        let cloud = PointCloud::from_points(&[
            PointXYZRGB::new([0.0, 0.0, 0.0], [255, 0, 0]),
            PointXYZRGB::new([1.0, 1.0, 5.0], [0, 255, 0]),
            PointXYZRGB::new([1.0, 1.0, 0.5], [0, 0, 255]),
        ]);
        let bev = generate_birdseye(&cloud, &raw_config(1.0)).unwrap();
        assert_eq!(bev.stats.kept_points, 2);
        assert_eq!((bev.stats.width, bev.stats.height), (2, 2));
        assert_eq!(bev.image.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(bev.image.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn everything_cropped_gives_white_canvas() {
        let cloud = PointCloud::from_points(&[
            PointXYZRGB::new([0.0, 0.0, 5.0], [255, 0, 0]),
            PointXYZRGB::new([1.0, 1.0, 6.0], [255, 0, 0]),
        ]);
        let bev = generate_birdseye(&cloud, &raw_config(0.5)).unwrap();
        assert_eq!(bev.stats.kept_points, 0);
        assert_eq!(bev.image.dimensions(), (3, 3));
        assert!(bev.image.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn empty_cloud_is_an_error() {
        let err = generate_birdseye(&PointCloud::new(), &BevConfig::default()).unwrap_err();
        assert!(matches!(err, BevError::EmptyCloud));
    }

    #[test]
    fn config_is_validated_before_anything_else() {
        let config = BevConfig {
            min_z: 1.0,
            max_z: -1.0,
            ..Default::default()
        };
        let err = generate_birdseye(&PointCloud::new(), &config).unwrap_err();
        assert!(matches!(err, BevError::InvalidHeightBand { .. }));
    }

    #[test]
    fn median_filter_removes_lone_point() {
        let cloud = PointCloud::from_points(&[
            PointXYZRGB::new([0.0, 0.0, 0.0], [255, 255, 255]),
            PointXYZRGB::new([1.0, 1.0, 0.0], [0, 0, 0]),
            PointXYZRGB::new([2.0, 2.0, 0.0], [255, 255, 255]),
        ]);
        let config = BevConfig {
            resolution: 1.0,
            ..Default::default()
        };
        let bev = generate_birdseye(&cloud, &config).unwrap();
        assert!(bev.image.pixels().all(|p| *p == BACKGROUND));
    }
}
