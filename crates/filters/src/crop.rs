use bevmap_core::{Aabb, PointCloud};

/// Keeps the points inside `aabb` (inclusive on every axis).
///
/// Order and colors of the retained points are preserved. An empty result is
/// a valid outcome.
pub fn crop_aabb(cloud: &PointCloud, aabb: &Aabb) -> PointCloud {
    if cloud.is_empty() || aabb.is_empty() {
        return PointCloud::new();
    }
    cloud.retain_where(|p| aabb.contains(&p))
}

/// Region spanning the cloud's natural X/Y extent and `[min_z, max_z]` in Z.
pub fn height_band(cloud: &PointCloud, min_z: f32, max_z: f32) -> Aabb {
    let natural = cloud.aabb();
    if natural.is_empty() {
        return natural;
    }
    natural.with_z_range(min_z, max_z)
}

/// Crops `cloud` to the horizontal slab `min_z <= z <= max_z`.
pub fn crop_height_band(cloud: &PointCloud, min_z: f32, max_z: f32) -> PointCloud {
    crop_aabb(cloud, &height_band(cloud, min_z, max_z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevmap_core::Colors;
    use proptest::prelude::*;

    #[test]
    fn excludes_points_above_band() {
        let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0, 1.0], vec![5.0, 0.0]);
        let cropped = crop_height_band(&cloud, -2.0, 2.0);
        assert_eq!(cropped.len(), 1);
        assert_eq!(cropped.point(0), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let cloud = PointCloud::from_xyz(vec![0.0; 3], vec![0.0; 3], vec![-2.0, 2.0, 2.5]);
        let cropped = crop_height_band(&cloud, -2.0, 2.0);
        assert_eq!(cropped.z, vec![-2.0, 2.0]);
    }

    #[test]
    fn empty_band_result_is_valid() {
        let cloud = PointCloud::from_xyz(vec![0.0], vec![0.0], vec![10.0]);
        assert!(crop_height_band(&cloud, -2.0, 2.0).is_empty());
    }

    #[test]
    fn crop_aabb_limits_every_axis() {
        let cloud = PointCloud::from_xyz(
            vec![1.0, 2.0, 3.0, 4.0, f32::NAN],
            vec![10.0, 20.0, 30.0, 40.0, 20.0],
            vec![0.0; 5],
        );
        let region = Aabb::new([2.0, 0.0, -1.0], [4.0, 30.0, 1.0]);
        let cropped = crop_aabb(&cloud, &region);
        assert_eq!(cropped.x, vec![2.0, 3.0]);
        assert_eq!(cropped.y, vec![20.0, 30.0]);
    }

    #[test]
    fn inverted_band_keeps_nothing() {
        let cloud = PointCloud::from_xyz(vec![0.0; 2], vec![0.0; 2], vec![0.0, 1.0]);
        assert!(crop_height_band(&cloud, 2.0, -2.0).is_empty());
    }

    #[test]
    fn height_band_keeps_natural_xy() {
        let cloud = PointCloud::from_xyz(vec![-3.0, 4.0], vec![1.0, 7.0], vec![0.0, 9.0]);
        let band = height_band(&cloud, -1.0, 1.0);
        assert_eq!(band.min, [-3.0, 1.0, -1.0]);
        assert_eq!(band.max, [4.0, 7.0, 1.0]);
    }

    #[test]
    fn height_band_of_empty_cloud_is_empty() {
        assert!(height_band(&PointCloud::new(), -1.0, 1.0).is_empty());
    }

    #[test]
    fn crop_keeps_colors_paired() {
        let cloud = PointCloud::from_xyz_rgb(
            vec![0.0, 1.0, 2.0],
            vec![0.0; 3],
            vec![0.0, 9.0, 1.0],
            Colors {
                r: vec![10, 20, 30],
                g: vec![0; 3],
                b: vec![0; 3],
            },
        );
        let cropped = crop_height_band(&cloud, -2.0, 2.0);
        assert_eq!(cropped.x, vec![0.0, 2.0]);
        assert_eq!(cropped.colors.unwrap().r, vec![10, 30]);
    }

    proptest! {
        #[test]
        fn cropped_points_lie_in_band(
            pts in prop::collection::vec(
                (-50.0f32..50.0f32, -50.0f32..50.0f32, -10.0f32..10.0f32),
                0..300
            ),
            min_z in -5.0f32..0.0f32,
            max_z in 0.0f32..5.0f32,
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let cropped = crop_height_band(&cloud, min_z, max_z);
            let expected = pts.iter().filter(|p| p.2 >= min_z && p.2 <= max_z).count();
            prop_assert_eq!(cropped.len(), expected);
            for z in &cropped.z {
                prop_assert!(*z >= min_z && *z <= max_z);
            }
        }
    }
}
