//! Geometry model: the concrete primitive types and the
//! [`GeometricPrimitive`] sum type that the stream stores

pub mod brep;
pub mod bspline;
pub mod curve;
pub mod curve_vector;
pub mod image;
pub mod moments;
pub mod polyface;
pub mod primitive;
pub mod solid;
pub mod text;

pub use brep::{BRepEntity, BRepType, FaceAttachments, FaceMesh, FaceSymbology, FallbackGeometry};
pub use bspline::{BsplineSurface, MIN_PIECES_PER_PATCH};
pub use curve::{BsplineCurve, CurvePrimitive, CurvePrimitiveType, Ellipse, Segment};
pub use curve_vector::{BoundaryType, CurveVector};
pub use image::ImageGraphic;
pub use polyface::{ExpectedClosure, Polyface};
pub use primitive::{GeometricPrimitive, GeometryType};
pub use solid::{
    BoxDetail, ConeDetail, ExtrusionDetail, SolidPrimitive, SolidPrimitiveType, SphereDetail,
};
pub use text::TextString;
