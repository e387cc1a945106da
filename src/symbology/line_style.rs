//! Line style references and per-geometry style modifiers

use bitflags::bitflags;

use crate::types::{LineStyleId, Matrix3, Transform, Vector3};

bitflags! {
    /// Which [`LineStyleParams`] fields override the style definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineStyleModifiers: u32 {
        /// No modifiers.
        const NONE = 0;
        /// Overall scale.
        const SCALE = 0x01;
        /// Dash scale.
        const DASH_SCALE = 0x02;
        /// Gap scale.
        const GAP_SCALE = 0x04;
        /// Start width.
        const START_WIDTH = 0x08;
        /// End width.
        const END_WIDTH = 0x10;
        /// Distance phase.
        const DISTANCE_PHASE = 0x20;
        /// Fractional phase.
        const FRACTIONAL_PHASE = 0x40;
        /// Center phase.
        const CENTER_PHASE = 0x80;
        /// Normal vector.
        const NORMAL = 0x100;
        /// Rotation matrix.
        const ROTATION = 0x200;
    }
}

/// Per-geometry modifiers applied on top of a line style definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyleParams {
    pub modifiers: LineStyleModifiers,
    pub scale: f64,
    pub dash_scale: f64,
    pub gap_scale: f64,
    pub start_width: f64,
    pub end_width: f64,
    pub distance_phase: f64,
    pub fractional_phase: f64,
    pub normal: Vector3,
    pub rotation: Matrix3,
}

impl Default for LineStyleParams {
    fn default() -> Self {
        LineStyleParams {
            modifiers: LineStyleModifiers::NONE,
            scale: 1.0,
            dash_scale: 1.0,
            gap_scale: 1.0,
            start_width: 0.0,
            end_width: 0.0,
            distance_phase: 0.0,
            fractional_phase: 0.0,
            normal: Vector3::ZERO,
            rotation: Matrix3::identity(),
        }
    }
}

impl LineStyleParams {
    /// Widest explicit width modifier
    pub fn max_width(&self) -> f64 {
        let mut width = 0.0_f64;
        if self.modifiers.contains(LineStyleModifiers::START_WIDTH) {
            width = width.max(self.start_width);
        }
        if self.modifiers.contains(LineStyleModifiers::END_WIDTH) {
            width = width.max(self.end_width);
        }
        width
    }

    /// Scale widths and scale factor, rotate the normal and frame
    pub fn apply_transform(&mut self, transform: &Transform) {
        let scale = transform.matrix.max_column_scale();
        if scale > 0.0 && (scale - 1.0).abs() > 1.0e-12 {
            self.scale = if self.modifiers.contains(LineStyleModifiers::SCALE) {
                self.scale * scale
            } else {
                scale
            };
            self.modifiers |= LineStyleModifiers::SCALE;
            self.start_width *= scale;
            self.end_width *= scale;
        }
        if self.modifiers.contains(LineStyleModifiers::NORMAL) {
            if let Some(normal) = transform.multiply_vector(self.normal).try_normalize() {
                self.normal = normal;
            }
        }
        let rotated = transform.matrix * self.rotation;
        if let Some(rotation) = rotated.square_and_normalize_columns() {
            self.rotation = rotation;
        }
    }

    fn is_equivalent(&self, other: &LineStyleParams) -> bool {
        const TOL: f64 = 1.0e-10;
        self.modifiers == other.modifiers
            && (self.scale - other.scale).abs() < TOL
            && (self.dash_scale - other.dash_scale).abs() < TOL
            && (self.gap_scale - other.gap_scale).abs() < TOL
            && (self.start_width - other.start_width).abs() < TOL
            && (self.end_width - other.end_width).abs() < TOL
            && (self.distance_phase - other.distance_phase).abs() < TOL
            && (self.fractional_phase - other.fractional_phase).abs() < TOL
            && self.normal.is_almost_equal(&other.normal, TOL)
            && (0..3).all(|i| self.rotation.column(i).is_almost_equal(&other.rotation.column(i), TOL))
    }
}

/// A line style reference with optional modifiers.
///
/// `definition_width` is filled in when params are cooked from the style
/// definition held by the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineStyleInfo {
    pub style_id: LineStyleId,
    pub params: Option<LineStyleParams>,
    pub definition_width: f64,
}

impl LineStyleInfo {
    pub fn new(style_id: LineStyleId, params: Option<LineStyleParams>) -> Self {
        LineStyleInfo {
            style_id,
            params,
            definition_width: 0.0,
        }
    }

    /// A valid style strokes its curves; the invalid id is a continuous line
    pub fn is_stroked(&self) -> bool {
        self.style_id.is_valid()
    }

    /// Largest half-width the style can add around a curve
    pub fn max_width(&self) -> f64 {
        let modifier = self.params.as_ref().map_or(0.0, |p| p.max_width());
        let scale = self
            .params
            .as_ref()
            .filter(|p| p.modifiers.contains(LineStyleModifiers::SCALE))
            .map_or(1.0, |p| p.scale);
        modifier.max(self.definition_width * scale)
    }

    pub fn is_equivalent(&self, other: &LineStyleInfo) -> bool {
        self.style_id == other.style_id
            && match (&self.params, &other.params) {
                (Some(a), Some(b)) => a.is_equivalent(b),
                (None, None) => true,
                _ => false,
            }
    }
}
