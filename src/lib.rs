//! # geomstream
//!
//! Binary geometry streams for CAD/BIM elements and geometry parts.
//!
//! An element's graphics are stored as a flat sequence of operations, each
//! a little-endian `opcode` and `length` followed by a payload padded to
//! eight bytes. Symbology operations change the running appearance and
//! geometry operations draw with it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geomstream::geometry::CurvePrimitive;
//! use geomstream::{
//!     BuilderConfiguration, CategoryId, CoordSystem, GeometryBuilder, GeometryCollection, Vector3,
//! };
//!
//! let category = CategoryId::new(1);
//! let mut builder = GeometryBuilder::create_3d(category, BuilderConfiguration::default())?;
//! let line = CurvePrimitive::create_line(Vector3::ZERO, Vector3::UNIT_X);
//! builder.append_curve_primitive(&line, CoordSystem::World)?;
//! let (stream, placement) = builder.finish_element()?;
//!
//! let collection =
//!     GeometryCollection::for_element(stream.as_bytes(), category, placement.to_transform());
//! for entry in collection.iter() {
//!     println!("{}: {}", entry.entry_id(), entry.opcode());
//! }
//! # Ok::<(), geomstream::GeomStreamError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`stream`] - opcodes, envelopes, payload codecs, the low level
//!   [`Writer`] and [`Reader`]
//! - [`GeometryCollection`] - geometry entries with resolved symbology and
//!   entry ids
//! - [`GeometryBuilder`] - validated, deduplicated construction of element
//!   and part streams
//! - [`Importer`] - id remapping between stores
//! - [`replay`] - drawing a stream into a [`DrawingConsumer`]

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod geometry_collection;
pub mod import;
pub mod kernel;
pub mod notification;
pub mod replay;
pub mod store;
pub mod stream;
pub mod symbology;
pub mod types;

// Re-export commonly used types
pub use error::{GeomStreamError, Result};
pub use types::{
    CategoryId, ColorDef, ElementId, FontId, GeometryPartId, LineStyleId, MaterialId, Placement, Range3d,
    SubCategoryId, TextureId, Transform, Vector2, Vector3, YawPitchRollAngles,
};

// Stream layer
pub use stream::{
    Collection, GeometryStream, GeometryStreamEntryId, HeaderFlags, OpCode, Operation, Reader, Writer,
};

// High level
pub use builder::{CoordSystem, GeometryBuilder};
pub use config::{BuilderConfiguration, FacetOptions, ImportOptions, ReplayOptions};
pub use geometry_collection::{GeometryCollection, GeometryEntry};
pub use import::{IdRemapper, Importer};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use replay::{DrawingConsumer, Replay, ReplayStatus};
pub use store::{GeometrySource, MemoryStore, SymbologyResolver};
pub use symbology::GeometryParams;
