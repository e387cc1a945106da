//! Tolerance-based assertions for points and ranges.

#![allow(dead_code)]

use geomstream::{Range3d, Vector3};

/// Default tolerance for floating-point comparisons.
pub const TOL: f64 = 1e-9;

/// Check approximate equality of two f64 values within `tol`.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

/// Assert two Vector3 values are approximately equal component-wise.
pub fn assert_vec3_eq(a: &Vector3, b: &Vector3, tol: f64) {
    assert!(
        approx_eq(a.x, b.x, tol) && approx_eq(a.y, b.y, tol) && approx_eq(a.z, b.z, tol),
        "Vector3 mismatch: ({},{},{}) vs ({},{},{}) tol={tol}",
        a.x,
        a.y,
        a.z,
        b.x,
        b.y,
        b.z
    );
}

/// Assert two ranges have approximately equal corners.
pub fn assert_range_eq(a: &Range3d, b: &Range3d, tol: f64) {
    assert!(a.is_almost_equal(b, tol), "Range mismatch: {a} vs {b} tol={tol}");
}

/// Whether `outer` encloses `inner`; a null `inner` is always enclosed.
pub fn encloses(outer: &Range3d, inner: &Range3d) -> bool {
    inner.is_null() || outer.contains_range(inner)
}
