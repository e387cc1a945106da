//! Which symbology each kind of geometry can display

use crate::stream::OpCode;
use crate::symbology::{FillDisplay, GeometryParams};
use crate::types::MaterialId;

/// Symbology properties an opcode can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub solid_fill: bool,
    pub pattern_or_gradient: bool,
    pub line_style: bool,
    pub material: bool,
}

impl Capabilities {
    const ALL: Capabilities = Capabilities {
        solid_fill: true,
        pattern_or_gradient: true,
        line_style: true,
        material: true,
    };

    const NONE: Capabilities = Capabilities {
        solid_fill: false,
        pattern_or_gradient: false,
        line_style: false,
        material: false,
    };

    /// Capabilities of the opcode a geometry is classified as.
    ///
    /// Open curves classify as `CurvePrimitive` and regions as
    /// `CurveVector`, whatever compact encoding the writer picks.
    pub fn for_opcode(opcode: OpCode) -> Self {
        match opcode {
            OpCode::GeometryPartInstance | OpCode::CurveVector => Self::ALL,
            OpCode::CurvePrimitive => Capabilities {
                line_style: true,
                ..Self::NONE
            },
            OpCode::Polyface => Capabilities {
                solid_fill: true,
                material: true,
                ..Self::NONE
            },
            OpCode::SolidPrimitive | OpCode::BsplineSurface | OpCode::ParasolidBRep => Capabilities {
                material: true,
                ..Self::NONE
            },
            OpCode::Image => Capabilities {
                solid_fill: true,
                ..Self::NONE
            },
            _ => Self::NONE,
        }
    }

    pub fn allows_everything(&self) -> bool {
        *self == Self::ALL
    }
}

/// Copy of `params` without the properties `capabilities` cannot display.
///
/// `None` when nothing needs removing. Inherited line styles and
/// materials are left alone.
pub fn strip_disallowed(params: &GeometryParams, capabilities: Capabilities) -> Option<GeometryParams> {
    if capabilities.allows_everything() {
        return None;
    }

    let mut invalid_pattern_or_gradient = false;
    let mut invalid_solid_fill = false;

    if params.fill_display() != FillDisplay::Never {
        match params.gradient() {
            Some(gradient) if !gradient.is_thematic() => {
                invalid_pattern_or_gradient |= !capabilities.pattern_or_gradient;
            }
            _ => invalid_solid_fill |= !capabilities.solid_fill,
        }
    }
    if !capabilities.pattern_or_gradient && params.pattern().is_some() {
        invalid_pattern_or_gradient = true;
    }
    let invalid_line_style = !capabilities.line_style
        && !params.is_line_style_from_sub_category_appearance()
        && params.has_stroked_line_style();
    let invalid_material = !capabilities.material
        && !params.is_material_from_sub_category_appearance()
        && params.material_id().is_valid();

    if !(invalid_pattern_or_gradient || invalid_solid_fill || invalid_line_style || invalid_material) {
        return None;
    }

    let mut local = params.clone();
    if invalid_pattern_or_gradient {
        local.set_gradient(None);
        local.set_pattern(None);
    }
    if invalid_pattern_or_gradient || invalid_solid_fill {
        local.set_fill_display(FillDisplay::Never);
    }
    if invalid_line_style {
        local.set_line_style(None);
    }
    if invalid_material {
        local.set_material_id(MaterialId::INVALID);
    }
    Some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::{GradientMode, GradientSymb, LineStyleInfo, PatternParams};
    use crate::types::{CategoryId, ColorDef, LineStyleId, SubCategoryId};

    fn filled() -> GeometryParams {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_fill_display(FillDisplay::Always);
        params.set_fill_color(ColorDef::RED);
        params
    }

    #[test]
    fn test_open_curve_loses_fill() {
        let params = filled();
        let local = strip_disallowed(&params, Capabilities::for_opcode(OpCode::CurvePrimitive)).unwrap();
        assert_eq!(local.fill_display(), FillDisplay::Never);
        assert_eq!(params.fill_display(), FillDisplay::Always);
    }

    #[test]
    fn test_region_keeps_everything() {
        let mut params = filled();
        params.set_pattern(Some(PatternParams::hatch(1.0, 0.0)));
        assert!(strip_disallowed(&params, Capabilities::for_opcode(OpCode::CurveVector)).is_none());
    }

    #[test]
    fn test_polyface_keeps_solid_fill_but_not_pattern() {
        let mut params = filled();
        assert!(strip_disallowed(&params, Capabilities::for_opcode(OpCode::Polyface)).is_none());

        params.set_pattern(Some(PatternParams::hatch(1.0, 0.0)));
        let local = strip_disallowed(&params, Capabilities::for_opcode(OpCode::Polyface)).unwrap();
        assert!(local.pattern().is_none());
        assert_eq!(local.fill_display(), FillDisplay::Never);
    }

    #[test]
    fn test_gradient_needs_pattern_capability() {
        let mut params = filled();
        params.set_gradient(Some(GradientSymb::new(GradientMode::Linear, Vec::new())));
        let local = strip_disallowed(&params, Capabilities::for_opcode(OpCode::Image)).unwrap();
        assert!(local.gradient().is_none());
        assert_eq!(local.fill_display(), FillDisplay::Never);
    }

    #[test]
    fn test_explicit_material_stripped_from_curve() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_material_id(MaterialId::new(9));
        let local = strip_disallowed(&params, Capabilities::for_opcode(OpCode::CurvePrimitive)).unwrap();
        assert!(!local.material_id().is_valid());
    }

    #[test]
    fn test_stroked_style_stripped_from_solid() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_line_style(Some(LineStyleInfo::new(LineStyleId::new(4), None)));
        let local = strip_disallowed(&params, Capabilities::for_opcode(OpCode::SolidPrimitive)).unwrap();
        assert!(local.line_style().is_none());
        assert!(params.has_stroked_line_style());
    }
}
