//! Yaw/pitch/roll orientation angles

use super::{Matrix3, Transform, Vector3};

/// Orientation as three rotations in degrees.
///
/// The rotation matrix is `Rz(yaw) * Ry(-pitch) * Rx(roll)`: yaw turns about
/// Z, positive pitch lifts the X axis toward Z, roll turns about X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YawPitchRollAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl YawPitchRollAngles {
    pub const fn from_degrees(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn is_zero(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0 && self.roll == 0.0
    }

    /// Rotation matrix for these angles
    pub fn to_matrix(&self) -> Matrix3 {
        let (s0, c0) = self.yaw.to_radians().sin_cos();
        let (s1, c1) = self.pitch.to_radians().sin_cos();
        let (s2, c2) = self.roll.to_radians().sin_cos();
        Matrix3::from_rows(
            [c0 * c1, -(s0 * c2 + c0 * s1 * s2), s0 * s2 - c0 * s1 * c2],
            [s0 * c1, c0 * c2 - s0 * s1 * s2, -(c0 * s2 + s0 * s1 * c2)],
            [s1, c1 * s2, c1 * c2],
        )
    }

    /// Transform rotating by these angles then moving to `origin`
    pub fn to_transform(&self, origin: Vector3) -> Transform {
        Transform::from_matrix_and_translation(self.to_matrix(), origin)
    }

    /// Extract angles from a rigid rotation; `None` if the matrix is not rigid
    pub fn from_matrix(matrix: &Matrix3) -> Option<Self> {
        if !matrix.is_rigid() {
            return None;
        }
        let m = &matrix.m;
        let yaw = m[1][0].atan2(m[0][0]);
        let pitch = m[2][0].atan2(m[0][0].hypot(m[1][0]));
        let roll = m[2][1].atan2(m[2][2]);
        Some(Self {
            yaw: yaw.to_degrees(),
            pitch: pitch.to_degrees(),
            roll: roll.to_degrees(),
        })
    }

    /// Split a transform into origin and angles, scale-free rotations only
    pub fn from_transform(transform: &Transform) -> Option<(Vector3, Self)> {
        Some((transform.translation, Self::from_matrix(&transform.matrix)?))
    }
}
