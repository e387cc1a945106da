//! RGBA color stored the way the stream stores it

use std::fmt;

/// A color packed as `0xTTBBGGRR`.
///
/// The high byte is transparency (0 = opaque), matching the stream's
/// 32-bit color fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorDef(u32);

impl ColorDef {
    pub const BLACK: ColorDef = ColorDef::from_rgb(0, 0, 0);
    pub const WHITE: ColorDef = ColorDef::from_rgb(255, 255, 255);
    pub const RED: ColorDef = ColorDef::from_rgb(255, 0, 0);
    pub const GREEN: ColorDef = ColorDef::from_rgb(0, 255, 0);
    pub const BLUE: ColorDef = ColorDef::from_rgb(0, 0, 255);

    pub const fn from_raw(value: u32) -> Self {
        ColorDef(value)
    }

    /// Create an opaque color from RGB values
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        ColorDef((r as u32) | ((g as u32) << 8) | ((b as u32) << 16))
    }

    /// Create a color with transparency (0 = opaque, 255 = invisible)
    pub const fn from_rgbt(r: u8, g: u8, b: u8, t: u8) -> Self {
        ColorDef(Self::from_rgb(r, g, b).0 | ((t as u32) << 24))
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }

    pub const fn red(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub const fn green(&self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn blue(&self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn transparency(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Display for ColorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBT({}, {}, {}, {})",
            self.red(),
            self.green(),
            self.blue(),
            self.transparency()
        )
    }
}
