//! Area patterns: hatch lines, cross hatch and symbol patterns

use crate::types::{ColorDef, GeometryPartId, Matrix3, Transform, Vector2, Vector3};

/// One line family of a DWG-style hatch definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchDefLine {
    /// Radians
    pub angle: f64,
    pub through: Vector2,
    pub offset: Vector2,
    pub dashes: Vec<f64>,
}

/// Area pattern parameters.
///
/// A valid `symbol_id` makes this a symbol pattern whose cells are copies
/// of that geometry part; otherwise it is a hatch or cross hatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternParams {
    pub origin: Vector3,
    pub orientation: Matrix3,
    pub primary_spacing: f64,
    pub secondary_spacing: f64,
    pub primary_angle: f64,
    pub secondary_angle: f64,
    pub scale: f64,
    pub color: Option<ColorDef>,
    pub weight: Option<u32>,
    pub invisible_boundary: bool,
    pub snappable: bool,
    pub symbol_id: GeometryPartId,
    pub hatch_lines: Vec<HatchDefLine>,
}

impl Default for PatternParams {
    fn default() -> Self {
        PatternParams {
            origin: Vector3::ZERO,
            orientation: Matrix3::identity(),
            primary_spacing: 0.0,
            secondary_spacing: 0.0,
            primary_angle: 0.0,
            secondary_angle: 0.0,
            scale: 1.0,
            color: None,
            weight: None,
            invisible_boundary: false,
            snappable: false,
            symbol_id: GeometryPartId::INVALID,
            hatch_lines: Vec::new(),
        }
    }
}

impl PatternParams {
    /// Single-direction hatch
    pub fn hatch(spacing: f64, angle: f64) -> Self {
        PatternParams {
            primary_spacing: spacing,
            primary_angle: angle,
            ..Default::default()
        }
    }

    pub fn is_symbol_pattern(&self) -> bool {
        self.symbol_id.is_valid()
    }

    pub fn apply_transform(&mut self, transform: &Transform) {
        let scale = transform.matrix.max_column_scale();
        self.origin = transform.multiply_point(self.origin);
        let rotated = transform.matrix * self.orientation;
        if let Some(orientation) = rotated.square_and_normalize_columns() {
            self.orientation = orientation;
        }
        if scale > 0.0 {
            self.primary_spacing *= scale;
            self.secondary_spacing *= scale;
            self.scale *= scale;
            for line in &mut self.hatch_lines {
                line.through = line.through * scale;
                line.offset = line.offset * scale;
                for dash in &mut line.dashes {
                    *dash *= scale;
                }
            }
        }
    }
}
