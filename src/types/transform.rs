//! Affine transforms for stream geometry
//!
//! `Matrix3` holds the rotation/scale block in row-major order and
//! `Transform` pairs it with a translation, giving a 3x4 affine map.
//! Inversion and decompositions go through `nalgebra`.

use crate::types::Vector3;
use nalgebra::Matrix3 as NaMatrix3;
use std::ops::Mul;

const IDENTITY_TOLERANCE: f64 = 1.0e-12;

/// 3x3 matrix (rotation, scale, skew)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    /// Matrix elements stored in row-major order
    pub m: [[f64; 3]; 3],
}

impl Matrix3 {
    /// Create identity matrix
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Create matrix from rows
    pub fn from_rows(row0: [f64; 3], row1: [f64; 3], row2: [f64; 3]) -> Self {
        Self { m: [row0, row1, row2] }
    }

    /// Create matrix whose columns are the given vectors
    pub fn from_columns(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self {
            m: [[x.x, y.x, z.x], [x.y, y.y, z.y], [x.z, y.z, z.z]],
        }
    }

    /// Create rotation matrix around Z axis
    pub fn rotation_z(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0])
    }

    /// Uniform scale matrix
    pub fn from_scale(scale: f64) -> Self {
        Self::from_rows([scale, 0.0, 0.0], [0.0, scale, 0.0], [0.0, 0.0, scale])
    }

    pub fn column(&self, index: usize) -> Vector3 {
        Vector3::new(self.m[0][index], self.m[1][index], self.m[2][index])
    }

    pub fn transpose(&self) -> Self {
        let m = &self.m;
        Self::from_rows(
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        )
    }

    pub fn determinant(&self) -> f64 {
        self.to_nalgebra().determinant()
    }

    /// Invert the matrix (returns None if singular)
    pub fn inverse(&self) -> Option<Self> {
        self.to_nalgebra().try_inverse().map(|inv| Self::from_nalgebra(&inv))
    }

    /// Multiply a column vector
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    pub fn is_identity(&self) -> bool {
        (0..3).all(|i| {
            (0..3).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (self.m[i][j] - expected).abs() <= IDENTITY_TOLERANCE
            })
        })
    }

    /// Orthonormal with positive determinant
    pub fn is_rigid(&self) -> bool {
        let product = self.transpose() * *self;
        product.is_identity_within(1.0e-10) && self.determinant() > 0.0
    }

    fn is_identity_within(&self, tolerance: f64) -> bool {
        (0..3).all(|i| {
            (0..3).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (self.m[i][j] - expected).abs() <= tolerance
            })
        })
    }

    /// Largest column length
    pub fn max_column_scale(&self) -> f64 {
        (0..3)
            .map(|i| self.column(i).length())
            .fold(0.0, f64::max)
    }

    /// Rebuild an orthonormal right-handed frame from columns 0 and 1.
    ///
    /// Column 0 keeps its direction, column 1 is squared against it and
    /// column 2 becomes their cross product. Returns `None` when the first
    /// two columns are parallel or zero.
    pub fn square_and_normalize_columns(&self) -> Option<Self> {
        let x = self.column(0).try_normalize()?;
        let z = x.cross(&self.column(1)).try_normalize()?;
        let y = z.cross(&x);
        Some(Self::from_columns(x, y, z))
    }

    pub(crate) fn to_nalgebra(&self) -> NaMatrix3<f64> {
        let m = &self.m;
        NaMatrix3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        )
    }

    pub(crate) fn from_nalgebra(na: &NaMatrix3<f64>) -> Self {
        Self::from_rows(
            [na[(0, 0)], na[(0, 1)], na[(0, 2)]],
            [na[(1, 0)], na[(1, 1)], na[(1, 2)]],
            [na[(2, 0)], na[(2, 1)], na[(2, 2)]],
        )
    }
}

impl Mul for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Affine transform: `p' = matrix * p + translation`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Rotation/scale block
    pub matrix: Matrix3,
    /// Translation column
    pub translation: Vector3,
}

impl Transform {
    /// Create identity transform
    pub const fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::ZERO,
        }
    }

    /// Create translation transform
    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation,
        }
    }

    pub fn from_matrix(matrix: Matrix3) -> Self {
        Self {
            matrix,
            translation: Vector3::ZERO,
        }
    }

    pub fn from_matrix_and_translation(matrix: Matrix3, translation: Vector3) -> Self {
        Self { matrix, translation }
    }

    /// Create uniform scaling transform about the origin
    pub fn from_scale(scale: f64) -> Self {
        Self::from_matrix(Matrix3::from_scale(scale))
    }

    /// Apply to a point
    pub fn multiply_point(&self, point: Vector3) -> Vector3 {
        if point.is_disconnect() {
            return point;
        }
        self.matrix.multiply_vector(point) + self.translation
    }

    /// Apply to a direction (translation ignored)
    pub fn multiply_vector(&self, vector: Vector3) -> Vector3 {
        self.matrix.multiply_vector(vector)
    }

    /// Apply in place to a point array
    pub fn multiply_points(&self, points: &mut [Vector3]) {
        for point in points.iter_mut() {
            *point = self.multiply_point(*point);
        }
    }

    /// Origin of the transformed frame
    pub fn origin(&self) -> Vector3 {
        self.translation
    }

    pub fn inverse(&self) -> Option<Transform> {
        let matrix = self.matrix.inverse()?;
        let translation = -matrix.multiply_vector(self.translation);
        Some(Transform { matrix, translation })
    }

    /// Check if transform is identity
    pub fn is_identity(&self) -> bool {
        self.matrix.is_identity() && self.translation.max_abs() <= IDENTITY_TOLERANCE
    }

    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Negative determinant
    pub fn has_mirror(&self) -> bool {
        self.determinant() < 0.0
    }

    /// Orthonormalize the rotation block, keeping the translation.
    ///
    /// Returns `None` when columns 0 and 1 do not span a plane.
    pub fn square_and_normalize(&self) -> Option<Transform> {
        Some(Transform {
            matrix: self.matrix.square_and_normalize_columns()?,
            translation: self.translation,
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Self;

    /// `(a * b)(p) == a(b(p))`
    fn mul(self, rhs: Self) -> Self::Output {
        Transform {
            matrix: self.matrix * rhs.matrix,
            translation: self.matrix.multiply_vector(rhs.translation) + self.translation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_matrix3_rotation_z() {
        let m = Matrix3::rotation_z(PI / 2.0);
        let result = m.multiply_vector(Vector3::UNIT_X);
        assert!(result.x.abs() < 1e-10);
        assert!((result.y - 1.0).abs() < 1e-10);
        assert!(m.is_rigid());
    }

    #[test]
    fn test_transform_composition_order() {
        let rotate = Transform::from_matrix(Matrix3::rotation_z(PI / 2.0));
        let shift = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        // rotate after shifting
        let p = (rotate * shift).multiply_point(Vector3::ZERO);
        assert!(p.x.abs() < 1e-10);
        assert!((p.y - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::from_matrix_and_translation(
            Matrix3::rotation_z(0.3) * Matrix3::from_scale(2.0),
            Vector3::new(5.0, -1.0, 2.0),
        );
        let inv = t.inverse().unwrap();
        let p = Vector3::new(1.0, 2.0, 3.0);
        let back = inv.multiply_point(t.multiply_point(p));
        assert!(back.is_almost_equal(&p, 1e-10));
        assert!((t * inv).is_identity() || (t * inv).matrix.is_identity_within(1e-10));
    }

    #[test]
    fn test_singular_inverse() {
        let t = Transform::from_scale(0.0);
        assert!(t.inverse().is_none());
    }

    #[test]
    fn test_square_and_normalize() {
        let skewed = Matrix3::from_columns(
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(1.0, 3.0, 0.0),
            Vector3::new(0.0, 0.0, 7.0),
        );
        let square = skewed.square_and_normalize_columns().unwrap();
        assert!(square.is_rigid());
        assert!(square.column(1).is_almost_equal(&Vector3::UNIT_Y, 1e-12));
    }

    #[test]
    fn test_mirror_detection() {
        let mirror = Transform::from_matrix(Matrix3::from_rows(
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ));
        assert!(mirror.has_mirror());
        assert!(!Transform::identity().has_mirror());
    }
}
