//! Tensor-product B-spline surfaces with optional uv trim loops

use super::moments::principal_axes_frame;
use crate::types::{Range3d, Transform, Vector2, Vector3};

/// Minimum facet pieces per surface patch when measuring trimmed range
pub const MIN_PIECES_PER_PATCH: usize = 3;

/// Padding applied to the pole range before clipping the faceted range
const POLE_RANGE_EXPANSION: f64 = 0.2;

/// B-spline surface.
///
/// Poles are stored row by row: `poles[v * num_u + u]`. Trim loops live in
/// normalized parameter space `[0, 1] x [0, 1]` and combine by parity.
#[derive(Debug, Clone, PartialEq)]
pub struct BsplineSurface {
    pub u_order: usize,
    pub v_order: usize,
    pub num_u: usize,
    pub num_v: usize,
    pub poles: Vec<Vector3>,
    pub weights: Option<Vec<f64>>,
    pub u_knots: Vec<f64>,
    pub v_knots: Vec<f64>,
    pub trims: Vec<Vec<Vector2>>,
}

impl BsplineSurface {
    /// Clamped uniform surface over a pole grid; `None` if the grid is
    /// too small for the orders
    pub fn from_poles(
        poles: Vec<Vector3>,
        num_u: usize,
        num_v: usize,
        u_order: usize,
        v_order: usize,
    ) -> Option<Self> {
        let surface = BsplineSurface {
            u_order,
            v_order,
            num_u,
            num_v,
            u_knots: clamped_uniform_knots(num_u, u_order),
            v_knots: clamped_uniform_knots(num_v, v_order),
            poles,
            weights: None,
            trims: Vec::new(),
        };
        surface.is_valid().then_some(surface)
    }

    /// Structural consistency of orders, counts and knot vectors
    pub fn is_valid(&self) -> bool {
        self.u_order >= 2
            && self.v_order >= 2
            && self.num_u >= self.u_order
            && self.num_v >= self.v_order
            && self.poles.len() == self.num_u * self.num_v
            && self.u_knots.len() == self.num_u + self.u_order
            && self.v_knots.len() == self.num_v + self.v_order
            && self
                .weights
                .as_ref()
                .map_or(true, |w| w.len() == self.poles.len())
    }

    pub fn has_trims(&self) -> bool {
        !self.trims.is_empty()
    }

    pub fn pole_range(&self) -> Range3d {
        Range3d::from_points(&self.poles)
    }

    /// Number of distinct knot intervals in u and v
    pub fn patch_counts(&self) -> (usize, usize) {
        (
            distinct_intervals(&self.u_knots, self.u_order, self.num_u),
            distinct_intervals(&self.v_knots, self.v_order, self.num_v),
        )
    }

    /// Evaluate at normalized parameters in `[0, 1]`
    pub fn evaluate(&self, u: f64, v: f64) -> Vector3 {
        let u = map_fraction(&self.u_knots, self.u_order, self.num_u, u);
        let v = map_fraction(&self.v_knots, self.v_order, self.num_v, v);
        let (du, dv) = (self.u_order - 1, self.v_order - 1);
        let su = find_span(&self.u_knots, du, self.num_u, u);
        let sv = find_span(&self.v_knots, dv, self.num_v, v);
        let nu = basis_functions(&self.u_knots, su, u, du);
        let nv = basis_functions(&self.v_knots, sv, v, dv);

        let mut sum = Vector3::ZERO;
        let mut weight_sum = 0.0;
        for (j, bv) in nv.iter().enumerate() {
            let row = sv - dv + j;
            for (i, bu) in nu.iter().enumerate() {
                let col = su - du + i;
                let index = row * self.num_u + col;
                let w = self.weights.as_ref().map_or(1.0, |w| w[index]);
                let b = bu * bv * w;
                sum += self.poles[index] * b;
                weight_sum += b;
            }
        }
        if weight_sum.abs() > 0.0 {
            sum / weight_sum
        } else {
            sum
        }
    }

    /// True when a normalized uv point is inside the trim loops (parity)
    pub fn is_inside_trims(&self, uv: Vector2) -> bool {
        if self.trims.is_empty() {
            return true;
        }
        self.trims
            .iter()
            .filter(|trim| point_in_polygon(uv, trim))
            .count()
            % 2
            == 1
    }

    /// Grid of surface points at `pieces_per_patch` samples per patch,
    /// keeping only samples inside the trims when `apply_trims` is set
    pub fn facet_points(&self, pieces_per_patch: usize, apply_trims: bool) -> Vec<Vector3> {
        let pieces = pieces_per_patch.max(MIN_PIECES_PER_PATCH);
        let (pu, pv) = self.patch_counts();
        let nu = pu.max(1) * pieces;
        let nv = pv.max(1) * pieces;
        let mut points = Vec::with_capacity((nu + 1) * (nv + 1));
        for j in 0..=nv {
            let v = j as f64 / nv as f64;
            for i in 0..=nu {
                let u = i as f64 / nu as f64;
                if apply_trims && !self.is_inside_trims(Vector2::new(u, v)) {
                    continue;
                }
                points.push(self.evaluate(u, v));
            }
        }
        points
    }

    /// Range of the surface, optionally after a transform.
    ///
    /// Untrimmed surfaces report the pole range. Trimmed surfaces are
    /// faceted and the faceted range is clipped to the pole range padded by
    /// 20% per axis; if the trims leave nothing the untrimmed surface is
    /// measured instead.
    pub fn range(&self, transform: Option<&Transform>) -> Range3d {
        let mut surface = self.clone();
        if let Some(t) = transform {
            surface.transform_in_place(t);
        }
        if !surface.has_trims() {
            return surface.pole_range();
        }
        let limit = surface
            .pole_range()
            .scale_about_center(1.0 + 2.0 * POLE_RANGE_EXPANSION);
        let faceted = Range3d::from_points(&surface.facet_points(MIN_PIECES_PER_PATCH, true));
        let range = faceted.intersection(&limit);
        if !range.is_null() {
            return range;
        }
        Range3d::from_points(&surface.facet_points(MIN_PIECES_PER_PATCH, false)).intersection(&limit)
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        transform.multiply_points(&mut self.poles);
    }

    /// Centroidal principal-axes frame of the poles
    pub fn principal_frame(&self) -> Option<Transform> {
        principal_axes_frame(&self.poles)
    }

    pub fn is_same_structure_and_geometry(&self, other: &BsplineSurface, tolerance: f64) -> bool {
        use super::curve::{same_points, same_scalars};
        self.u_order == other.u_order
            && self.v_order == other.v_order
            && self.num_u == other.num_u
            && self.num_v == other.num_v
            && same_points(&self.poles, &other.poles, tolerance)
            && same_scalars(&self.u_knots, &other.u_knots, tolerance)
            && same_scalars(&self.v_knots, &other.v_knots, tolerance)
            && match (&self.weights, &other.weights) {
                (Some(a), Some(b)) => same_scalars(a, b, tolerance),
                (None, None) => true,
                _ => false,
            }
            && self.trims.len() == other.trims.len()
    }
}

/// Clamped knot vector with uniform interior knots on `[0, 1]`
pub(crate) fn clamped_uniform_knots(num_poles: usize, order: usize) -> Vec<f64> {
    let interior = num_poles.saturating_sub(order);
    let mut knots = vec![0.0; order];
    for i in 1..=interior {
        knots.push(i as f64 / (interior + 1) as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(order));
    knots
}

fn distinct_intervals(knots: &[f64], order: usize, num_poles: usize) -> usize {
    (order - 1..num_poles)
        .filter(|&i| knots[i + 1] > knots[i])
        .count()
}

fn map_fraction(knots: &[f64], order: usize, num_poles: usize, fraction: f64) -> f64 {
    let a = knots[order - 1];
    let b = knots[num_poles];
    a + (b - a) * fraction.clamp(0.0, 1.0)
}

fn find_span(knots: &[f64], degree: usize, num_poles: usize, t: f64) -> usize {
    if t >= knots[num_poles] {
        return num_poles - 1;
    }
    if t <= knots[degree] {
        return degree;
    }
    let (mut low, mut high) = (degree, num_poles);
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis functions at `t` for the given span (Cox-de Boor)
fn basis_functions(knots: &[f64], span: usize, t: f64, degree: usize) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() > 0.0 { n[r] / denom } else { 0.0 };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

fn point_in_polygon(p: Vector2, polygon: &[Vector2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
