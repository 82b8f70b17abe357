use crate::traits::{HasColor, HasPosition};
use crate::Aabb;

/// Point cloud stored as structure-of-arrays.
///
/// `colors`, when present, has exactly one entry per point; every operation
/// that reorders or subsets points carries the colors along.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

/// Per-point RGB colors in [0, 255].
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, rgb: [u8; 3]) {
        self.r.push(rgb[0]);
        self.g.push(rgb[1]);
        self.b.push(rgb[2]);
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, i: usize) -> [u8; 3] {
        [self.r[i], self.g[i], self.b[i]]
    }

    /// Converts a unit-range float channel to a byte.
    ///
    /// Multiplies by 255 and truncates; out-of-range and NaN inputs saturate
    /// to 0 or 255.
    pub fn unit_to_u8(v: f32) -> u8 {
        (v * 255.0) as u8
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_xyz_rgb(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, colors: Colors) -> Self {
        let mut cloud = Self::from_xyz(x, y, z);
        assert_eq!(
            colors.len(),
            cloud.len(),
            "colors must have one entry per point"
        );
        cloud.colors = Some(colors);
        cloud
    }

    /// Builds a colored cloud from any point type carrying position and color.
    pub fn from_points<P: HasPosition + HasColor>(points: &[P]) -> Self {
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());
        let mut colors = Colors::with_capacity(points.len());

        for p in points {
            let [px, py, pz] = p.position();
            x.push(px);
            y.push(py);
            z.push(pz);
            colors.push(p.color());
        }

        Self::from_xyz_rgb(x, y, z, colors)
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Color of point `i`, or `None` for an uncolored cloud.
    pub fn color(&self, i: usize) -> Option<[u8; 3]> {
        self.colors.as_ref().map(|c| c.get(i))
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self { x, y, z, colors }
    }

    /// Keeps the points for which `keep` returns true, in their original order.
    pub fn retain_where(&self, mut keep: impl FnMut([f32; 3]) -> bool) -> Self {
        let indices: Vec<usize> = self
            .iter_points()
            .enumerate()
            .filter_map(|(i, p)| keep(p).then_some(i))
            .collect();
        self.select(&indices)
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Colors, PointCloud};
    use crate::PointXYZRGB;
    use proptest::prelude::*;

    fn colored_cloud() -> PointCloud {
        PointCloud::from_xyz_rgb(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![10.0, 11.0, 12.0, 13.0],
            vec![20.0, 21.0, 22.0, 23.0],
            Colors {
                r: vec![1, 2, 3, 4],
                g: vec![5, 6, 7, 8],
                b: vec![9, 10, 11, 12],
            },
        )
    }

    #[test]
    fn new_is_empty() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert!(!cloud.has_colors());
    }

    #[test]
    fn from_xyz_builds_cloud() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.0, 3.0, 5.0]);
        assert_eq!(cloud.point(1), [2.0, 4.0, 6.0]);
        assert_eq!(cloud.color(0), None);
    }

    #[test]
    fn from_points_keeps_colors_paired() {
        let cloud = PointCloud::from_points(&[
            PointXYZRGB::new([0.0, 0.0, 0.0], [255, 0, 0]),
            PointXYZRGB::new([1.0, 1.0, 0.0], [0, 0, 255]),
        ]);
        assert_eq!(cloud.point(1), [1.0, 1.0, 0.0]);
        assert_eq!(cloud.color(0), Some([255, 0, 0]));
        assert_eq!(cloud.color(1), Some([0, 0, 255]));
    }

    #[test]
    fn select_subsets_points_and_colors() {
        let selected = colored_cloud().select(&[3, 1]);
        assert_eq!(selected.x, vec![3.0, 1.0]);
        assert_eq!(selected.y, vec![13.0, 11.0]);
        assert_eq!(selected.z, vec![23.0, 21.0]);
        assert_eq!(selected.color(0), Some([4, 8, 12]));
        assert_eq!(selected.color(1), Some([2, 6, 10]));
    }

    #[test]
    fn retain_where_preserves_order() {
        let kept = colored_cloud().retain_where(|p| p[0] != 1.0);
        assert_eq!(kept.x, vec![0.0, 2.0, 3.0]);
        assert_eq!(kept.colors.as_ref().unwrap().r, vec![1, 3, 4]);
    }

    #[test]
    fn unit_to_u8_truncates_and_saturates() {
        assert_eq!(Colors::unit_to_u8(1.0), 255);
        assert_eq!(Colors::unit_to_u8(0.5), 127);
        assert_eq!(Colors::unit_to_u8(0.0), 0);
        assert_eq!(Colors::unit_to_u8(2.0), 255);
        assert_eq!(Colors::unit_to_u8(-1.0), 0);
        assert_eq!(Colors::unit_to_u8(f32::NAN), 0);
    }

    #[test]
    fn aabb_ignores_nan() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, f32::NAN, 2.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        );
        let aabb = cloud.aabb();
        assert!(aabb.contains(&[0.0, 1.0, 4.0]));
        assert!(aabb.contains(&[2.0, 3.0, 6.0]));
        assert!(!aabb.contains(&[f32::NAN, 2.0, 5.0]));
    }

    #[test]
    #[should_panic]
    fn from_xyz_panics_on_mismatch() {
        let _ = PointCloud::from_xyz(vec![1.0], vec![2.0, 3.0], vec![4.0]);
    }

    #[test]
    #[should_panic]
    fn from_xyz_rgb_panics_on_color_mismatch() {
        let _ = PointCloud::from_xyz_rgb(
            vec![1.0],
            vec![2.0],
            vec![3.0],
            Colors::with_capacity(0),
        );
    }

    proptest! {
        #[test]
        fn aabb_contains_all_finite_points(
            pts in prop::collection::vec((-1000.0f32..1000.0f32, -1000.0f32..1000.0f32, -1000.0f32..1000.0f32), 1..500)
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let aabb = cloud.aabb();
            for p in cloud.iter_points() {
                prop_assert!(aabb.contains(&p));
            }
        }

        #[test]
        fn select_keeps_color_correspondence(
            data in prop::collection::vec((-10.0f32..10.0f32, any::<u8>()), 1..200),
            idxs in prop::collection::vec(0usize..200, 0..200)
        ) {
            let n = data.len();
            let mut colors = Colors::with_capacity(n);
            for (_, c) in &data {
                colors.push([*c, c.wrapping_add(1), c.wrapping_add(2)]);
            }
            let cloud = PointCloud::from_xyz_rgb(
                data.iter().map(|p| p.0).collect(),
                vec![0.0; n],
                vec![0.0; n],
                colors,
            );
            let valid: Vec<usize> = idxs.into_iter().filter(|i| *i < n).collect();
            let out = cloud.select(&valid);
            prop_assert_eq!(out.len(), valid.len());
            for (j, &i) in valid.iter().enumerate() {
                prop_assert_eq!(out.point(j), cloud.point(i));
                prop_assert_eq!(out.color(j), cloud.color(i));
            }
        }
    }
}
