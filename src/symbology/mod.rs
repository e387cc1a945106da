//! Symbology: the appearance state that symbology operations carry and
//! geometry operations inherit

pub mod fill;
pub mod line_style;
pub mod params;
pub mod pattern;

pub use fill::{BackgroundFill, FillDisplay, GradientMode, GradientSymb};
pub use line_style::{LineStyleInfo, LineStyleModifiers, LineStyleParams};
pub use params::{AppearanceOverrides, GeometryParams};
pub use pattern::{HatchDefLine, PatternParams};

use crate::types::{ColorDef, LineStyleId, MaterialId};

/// Purpose of a piece of geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum GeometryClass {
    #[default]
    Primary = 0,
    Construction = 1,
    Dimension = 2,
    Pattern = 3,
}

impl GeometryClass {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => GeometryClass::Construction,
            2 => GeometryClass::Dimension,
            3 => GeometryClass::Pattern,
            _ => GeometryClass::Primary,
        }
    }
}

/// Default appearance a sub-category supplies to inherited properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubCategoryAppearance {
    pub color: ColorDef,
    pub fill_color: ColorDef,
    pub weight: u32,
    pub style: LineStyleId,
    pub material: MaterialId,
    pub priority: i32,
    pub transparency: f64,
    pub invisible: bool,
}
