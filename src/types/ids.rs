//! Typed 64-bit identifiers for store objects referenced from a stream
//!
//! Zero is reserved as the invalid id for every kind.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            /// The invalid id (0)
            pub const INVALID: $name = $name(0);

            #[inline]
            pub const fn new(value: u64) -> Self {
                $name(value)
            }

            #[inline]
            pub const fn value(&self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn is_valid(&self) -> bool {
                self.0 != 0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#X}", self.0)
            }
        }
    };
}

define_id!(
    /// Element owning a geometry stream
    ElementId
);
define_id!(
    /// Drawing category
    CategoryId
);
define_id!(
    /// Sub-category of a category; carries default appearance
    SubCategoryId
);
define_id!(
    /// Line style definition
    LineStyleId
);
define_id!(
    /// Render material
    MaterialId
);
define_id!(
    /// Reusable geometry part (its own stream)
    GeometryPartId
);
define_id!(
    /// Font used by text strings
    FontId
);
define_id!(
    /// Image texture
    TextureId
);
