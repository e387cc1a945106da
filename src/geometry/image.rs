//! Raster image graphics: a texture mapped onto a planar quadrilateral

use crate::types::{Range3d, TextureId, Transform, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGraphic {
    /// Corners in order: origin, +x, +x+y, +y
    pub corners: [Vector3; 4],
    pub texture_id: TextureId,
    pub has_border: bool,
}

impl ImageGraphic {
    pub fn new(corners: [Vector3; 4], texture_id: TextureId) -> Self {
        ImageGraphic {
            corners,
            texture_id,
            has_border: false,
        }
    }

    /// Images without a texture are never written
    pub fn is_valid(&self) -> bool {
        self.texture_id.is_valid()
    }

    pub fn range(&self) -> Range3d {
        Range3d::from_points(&self.corners)
    }

    pub fn transform_in_place(&mut self, transform: &Transform) {
        transform.multiply_points(&mut self.corners);
    }
}
