//! Core value types shared by geometry, symbology and the stream codec

pub mod angles;
pub mod color;
pub mod ids;
pub mod placement;
pub mod range;
pub mod transform;
pub mod vector;

pub use angles::YawPitchRollAngles;
pub use color::ColorDef;
pub use ids::{
    CategoryId, ElementId, FontId, GeometryPartId, LineStyleId, MaterialId, SubCategoryId,
    TextureId,
};
pub use placement::Placement;
pub use range::Range3d;
pub use transform::{Matrix3, Transform};
pub use vector::{Vector2, Vector3, DISCONNECT};
