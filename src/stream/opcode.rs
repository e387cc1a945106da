//! Operation codes

use std::fmt;

/// Operation code of a stream operation.
///
/// Discriminants are the persisted wire values and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum OpCode {
    #[default]
    Invalid = 0,
    /// Stream format header, first operation of an element or part stream
    Header = 1,
    /// Range hint for the operation that follows
    SubGraphicRange = 2,
    GeometryPartInstance = 3,
    BasicSymbology = 4,
    /// Compact 3-D points with a boundary flag
    PointPrimitive = 5,
    /// Compact 2-D points with a boundary flag
    PointPrimitive2d = 6,
    /// Compact arc with a boundary flag
    ArcPrimitive = 7,
    CurveVector = 8,
    Polyface = 9,
    CurvePrimitive = 10,
    SolidPrimitive = 11,
    BsplineSurface = 12,
    AreaFill = 19,
    Pattern = 20,
    Material = 21,
    TextString = 22,
    LineStyleModifiers = 23,
    ParasolidBRep = 25,
    /// Mesh fallback trailing a `ParasolidBRep`
    BRepPolyface = 26,
    /// Curve fallback trailing a `ParasolidBRep`
    BRepCurveVector = 27,
    Image = 28,
}

impl OpCode {
    /// Unknown values map to `Invalid`
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => OpCode::Header,
            2 => OpCode::SubGraphicRange,
            3 => OpCode::GeometryPartInstance,
            4 => OpCode::BasicSymbology,
            5 => OpCode::PointPrimitive,
            6 => OpCode::PointPrimitive2d,
            7 => OpCode::ArcPrimitive,
            8 => OpCode::CurveVector,
            9 => OpCode::Polyface,
            10 => OpCode::CurvePrimitive,
            11 => OpCode::SolidPrimitive,
            12 => OpCode::BsplineSurface,
            19 => OpCode::AreaFill,
            20 => OpCode::Pattern,
            21 => OpCode::Material,
            22 => OpCode::TextString,
            23 => OpCode::LineStyleModifiers,
            25 => OpCode::ParasolidBRep,
            26 => OpCode::BRepPolyface,
            27 => OpCode::BRepCurveVector,
            28 => OpCode::Image,
            _ => OpCode::Invalid,
        }
    }

    pub fn value(self) -> u32 {
        self as u32
    }

    /// Operations that produce drawable geometry.
    ///
    /// The BRep fallbacks are excluded: they repeat the geometry of the
    /// `ParasolidBRep` before them.
    pub fn is_geometry_op(self) -> bool {
        matches!(
            self,
            OpCode::PointPrimitive
                | OpCode::PointPrimitive2d
                | OpCode::ArcPrimitive
                | OpCode::CurveVector
                | OpCode::Polyface
                | OpCode::CurvePrimitive
                | OpCode::SolidPrimitive
                | OpCode::BsplineSurface
                | OpCode::ParasolidBRep
                | OpCode::TextString
                | OpCode::Image
        )
    }

    pub fn is_brep_fallback(self) -> bool {
        matches!(self, OpCode::BRepPolyface | OpCode::BRepCurveVector)
    }

    /// Operations that update the running symbology
    pub fn is_symbology_op(self) -> bool {
        matches!(
            self,
            OpCode::BasicSymbology
                | OpCode::LineStyleModifiers
                | OpCode::AreaFill
                | OpCode::Pattern
                | OpCode::Material
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(OpCode::Header.value(), 1);
        assert_eq!(OpCode::AreaFill.value(), 19);
        assert_eq!(OpCode::LineStyleModifiers.value(), 23);
        assert_eq!(OpCode::Image.value(), 28);
    }

    #[test]
    fn test_from_u32_round_trip() {
        for v in 0..40u32 {
            let op = OpCode::from_u32(v);
            if op != OpCode::Invalid {
                assert_eq!(op.value(), v);
            }
        }
        assert_eq!(OpCode::from_u32(24), OpCode::Invalid);
    }

    #[test]
    fn test_categories() {
        assert!(OpCode::ArcPrimitive.is_geometry_op());
        assert!(!OpCode::BRepPolyface.is_geometry_op());
        assert!(OpCode::BRepPolyface.is_brep_fallback());
        assert!(OpCode::Material.is_symbology_op());
        assert!(!OpCode::SubGraphicRange.is_symbology_op());
    }
}
