//! Element placement (origin, orientation, element-aligned box)

use super::{Range3d, Transform, Vector3, YawPitchRollAngles};

/// Placement of an element's local coordinate system in the world.
///
/// 2D placements keep only yaw and a zero z origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub origin: Vector3,
    pub angles: YawPitchRollAngles,
    /// Element-aligned box in local coordinates
    pub element_box: Range3d,
    pub is_3d: bool,
}

impl Placement {
    pub fn new_3d(origin: Vector3, angles: YawPitchRollAngles) -> Self {
        Self {
            origin,
            angles,
            element_box: Range3d::null(),
            is_3d: true,
        }
    }

    pub fn new_2d(origin: Vector3, rotation_degrees: f64) -> Self {
        Self {
            origin: Vector3::new(origin.x, origin.y, 0.0),
            angles: YawPitchRollAngles::from_degrees(rotation_degrees, 0.0, 0.0),
            element_box: Range3d::null(),
            is_3d: false,
        }
    }

    /// Local to world
    pub fn to_transform(&self) -> Transform {
        self.angles.to_transform(self.origin)
    }

    /// Placement is usable once its box is non-empty
    pub fn is_valid(&self) -> bool {
        self.element_box.is_valid_box()
            && self.origin.to_array().iter().all(|v| v.is_finite())
    }

    /// World-aligned range of the element box
    pub fn calculate_range(&self) -> Range3d {
        self.element_box.transformed(&self.to_transform())
    }
}
