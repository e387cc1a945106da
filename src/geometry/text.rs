//! Single-line text runs

use crate::types::{FontId, Matrix3, Range3d, Transform, Vector3};

/// A run of text in one font and size.
///
/// The text box is measured as `width` per character by `height`, in the
/// text's own frame (`orientation` at `origin`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextString {
    pub text: String,
    pub font: FontId,
    pub height: f64,
    /// Nominal character width
    pub width: f64,
    pub origin: Vector3,
    pub orientation: Matrix3,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underlined: bool,
}

impl TextString {
    pub fn new(text: impl Into<String>, font: FontId, height: f64) -> Self {
        TextString {
            text: text.into(),
            font,
            height,
            width: height,
            origin: Vector3::ZERO,
            orientation: Matrix3::identity(),
            is_bold: false,
            is_italic: false,
            is_underlined: false,
        }
    }

    /// Text frame to stream coordinates
    pub fn compute_transform(&self) -> Transform {
        Transform::from_matrix_and_translation(self.orientation, self.origin)
    }

    /// Cell box in the text frame, without adornment padding
    pub fn cell_range(&self) -> Range3d {
        let advance = self.width * self.text.chars().count() as f64;
        Range3d::new(Vector3::ZERO, Vector3::new(advance, self.height, 0.0))
    }

    /// Cell box padded vertically by half the height on each side so
    /// descenders and adornments fit, then placed in stream coordinates
    pub fn range(&self, transform: Option<&Transform>) -> Range3d {
        let mut local = self.cell_range();
        local.expand(0.0, self.height / 2.0, 0.0);
        let placed = local.transformed(&self.compute_transform());
        match transform {
            Some(t) => placed.transformed(t),
            None => placed,
        }
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        let scale = transform.matrix.max_column_scale();
        self.origin = transform.multiply_point(self.origin);
        let rotated = transform.matrix * self.orientation;
        self.orientation = rotated.square_and_normalize_columns().unwrap_or(rotated);
        self.height *= scale;
        self.width *= scale;
    }
}
