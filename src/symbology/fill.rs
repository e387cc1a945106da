//! Area fill display modes and gradient fills

use crate::types::ColorDef;

/// When a closed region is drawn filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FillDisplay {
    /// Never filled
    #[default]
    Never = 0,
    /// Filled when the view has fill display turned on
    ByView = 1,
    /// Always filled
    Always = 2,
    /// Always filled, and drawn behind other geometry in its plane
    Blanking = 3,
}

impl FillDisplay {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => FillDisplay::ByView,
            2 => FillDisplay::Always,
            3 => FillDisplay::Blanking,
            _ => FillDisplay::Never,
        }
    }

    /// Whether a region with this fill mode is drawn filled in a view
    pub fn is_visible(self, view_fill_enabled: bool) -> bool {
        match self {
            FillDisplay::Never => false,
            FillDisplay::ByView => view_fill_enabled,
            FillDisplay::Always | FillDisplay::Blanking => true,
        }
    }
}

/// Fill that takes the view's background color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BackgroundFill {
    #[default]
    None = 0,
    Solid = 1,
    /// Background fill drawn with an outline in the line color
    Outline = 2,
}

impl BackgroundFill {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => BackgroundFill::Solid,
            2 => BackgroundFill::Outline,
            _ => BackgroundFill::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum GradientMode {
    #[default]
    None = 0,
    Linear = 1,
    Curved = 2,
    Cylindrical = 3,
    Spherical = 4,
    Hemispherical = 5,
    /// Colors driven by an analysis value rather than position
    Thematic = 6,
}

impl GradientMode {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => GradientMode::Linear,
            2 => GradientMode::Curved,
            3 => GradientMode::Cylindrical,
            4 => GradientMode::Spherical,
            5 => GradientMode::Hemispherical,
            6 => GradientMode::Thematic,
            _ => GradientMode::None,
        }
    }
}

/// Gradient fill definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradientSymb {
    pub mode: GradientMode,
    pub flags: u16,
    /// Radians
    pub angle: f64,
    pub tint: f64,
    pub shift: f64,
    /// Key colors and their positions in `[0, 1]`
    pub keys: Vec<(ColorDef, f64)>,
}

impl GradientSymb {
    pub fn new(mode: GradientMode, keys: Vec<(ColorDef, f64)>) -> Self {
        GradientSymb {
            mode,
            keys,
            ..Default::default()
        }
    }

    pub fn is_thematic(&self) -> bool {
        self.mode == GradientMode::Thematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_visibility() {
        assert!(!FillDisplay::Never.is_visible(true));
        assert!(FillDisplay::ByView.is_visible(true));
        assert!(!FillDisplay::ByView.is_visible(false));
        assert!(FillDisplay::Always.is_visible(false));
        assert!(FillDisplay::Blanking.is_visible(false));
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(FillDisplay::from_u32(2), FillDisplay::Always);
        assert_eq!(FillDisplay::from_u32(99), FillDisplay::Never);
        assert_eq!(GradientMode::from_u32(6), GradientMode::Thematic);
        assert_eq!(BackgroundFill::from_u8(2), BackgroundFill::Outline);
    }
}
