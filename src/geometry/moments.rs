//! Centroid and principal axes of a point cloud

use crate::types::{Matrix3, Transform, Vector3};
use nalgebra::{Matrix3 as NaMatrix3, SymmetricEigen};

/// Frame at the centroid whose columns are the principal axes, largest
/// spread first. Returns `None` for an empty cloud.
///
/// Degenerate clouds (all points coincident) yield the world axes at the
/// centroid.
pub fn principal_axes_frame(points: &[Vector3]) -> Option<Transform> {
    let valid: Vec<Vector3> = points.iter().copied().filter(|p| !p.is_disconnect()).collect();
    if valid.is_empty() {
        return None;
    }
    let n = valid.len() as f64;
    let mut centroid = Vector3::ZERO;
    for p in &valid {
        centroid += *p;
    }
    let centroid = centroid / n;

    let mut covariance = NaMatrix3::<f64>::zeros();
    for p in &valid {
        let d = *p - centroid;
        let v = [d.x, d.y, d.z];
        for i in 0..3 {
            for j in 0..3 {
                covariance[(i, j)] += v[i] * v[j];
            }
        }
    }
    if covariance.iter().all(|v| v.abs() < 1.0e-24) {
        return Some(Transform::from_translation(centroid));
    }

    let eigen = SymmetricEigen::new(covariance);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let axis = |k: usize| {
        let c = eigen.eigenvectors.column(order[k]);
        Vector3::new(c[0], c[1], c[2])
    };
    let x = canonical_sign(axis(0));
    let y = canonical_sign(axis(1));
    let z = x.cross(&y);
    Some(Transform::from_matrix_and_translation(
        Matrix3::from_columns(x, y, z),
        centroid,
    ))
}

/// Flip so the largest component is positive, for stable frames
fn canonical_sign(v: Vector3) -> Vector3 {
    let a = v.to_array();
    let mut largest = 0;
    for i in 1..3 {
        if a[i].abs() > a[largest].abs() {
            largest = i;
        }
    }
    if a[largest] < 0.0 {
        -v
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elongated_cloud() {
        let points = vec![
            Vector3::new(-10.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let frame = principal_axes_frame(&points).unwrap();
        assert!(frame.translation.is_almost_equal(&Vector3::ZERO, 1e-12));
        assert!(frame.matrix.column(0).is_almost_equal(&Vector3::UNIT_X, 1e-9));
        assert!(frame.matrix.is_rigid());
    }

    #[test]
    fn test_single_point() {
        let frame = principal_axes_frame(&[Vector3::new(1.0, 2.0, 3.0)]).unwrap();
        assert!(frame.matrix.is_identity());
        assert_eq!(frame.translation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_empty() {
        assert!(principal_axes_frame(&[]).is_none());
    }
}
