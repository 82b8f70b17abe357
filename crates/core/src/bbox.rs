/// Axis-aligned bounding box in world coordinates (meters).
///
/// An empty box contains nothing; the first finite point expanded into it
/// becomes both corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
    empty: bool,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
            empty: true,
        }
    }

    /// Builds a box from explicit corners. Corners are taken as given, so a
    /// box with `max < min` on some axis contains no point.
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self {
            min,
            max,
            empty: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Returns a copy with the Z bounds replaced, keeping X/Y as they are.
    ///
    /// Used to turn the natural extent of a cloud into a height band.
    pub fn with_z_range(&self, min_z: f32, max_z: f32) -> Self {
        let mut out = self.clone();
        out.min[2] = min_z;
        out.max[2] = max_z;
        out
    }

    /// `max - min` per axis; zero for an empty box.
    pub fn extent(&self) -> [f32; 3] {
        if self.empty {
            return [0.0; 3];
        }
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn expand_with_point(&mut self, point: [f32; 3]) {
        if !point.iter().all(|v| v.is_finite()) {
            return;
        }

        if self.empty {
            self.min = point;
            self.max = point;
            self.empty = false;
            return;
        }

        for (axis, &val) in point.iter().enumerate() {
            self.min[axis] = self.min[axis].min(val);
            self.max[axis] = self.max[axis].max(val);
        }
    }

    /// Inclusive containment test. Non-finite points are never contained.
    pub fn contains(&self, point: &[f32; 3]) -> bool {
        if self.empty || !point.iter().all(|v| v.is_finite()) {
            return false;
        }

        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn from_xyz(x: &[f32], y: &[f32], z: &[f32]) -> Self {
        let n = x.len().min(y.len()).min(z.len());
        let mut aabb = Self::empty();
        for i in 0..n {
            aabb.expand_with_point([x[i], y[i], z[i]]);
        }
        aabb
    }
}
