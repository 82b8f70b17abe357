use crate::traits::{HasColor, HasPosition};

/// A colored point, mostly used to build clouds point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointXYZRGB {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PointXYZRGB {
    pub fn new(position: [f32; 3], color: [u8; 3]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            r: color[0],
            g: color[1],
            b: color[2],
        }
    }
}

impl HasPosition for PointXYZRGB {
    fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl HasColor for PointXYZRGB {
    fn color(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}
