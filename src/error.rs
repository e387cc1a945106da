//! Error types for the geometry stream codec

use std::io;
use thiserror::Error;

use crate::stream::OpCode;

/// Main error type for geometry stream operations
#[derive(Debug, Error)]
pub enum GeomStreamError {
    /// IO error from the payload cursor
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Requested typed view does not match the operation's opcode
    #[error("Decode mismatch: expected {expected:?}, found {actual:?}")]
    DecodeMismatch { expected: OpCode, actual: OpCode },

    /// Nested payload is truncated or malformed
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// Curve vector nesting is not valid for its boundary type
    #[error("Invalid curve vector: {0}")]
    InvalidCurveVector(String),

    /// Disconnect point inside a primitive that forbids gaps
    #[error("Disconnect point not allowed in a compact primitive")]
    DisconnectPoint,

    /// Geometry rejected by a factory or writer
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Operation not allowed in the current builder state
    #[error("Operation not allowed: {0}")]
    DisallowedOperation(String),

    /// Builder finish or placement precondition failed
    #[error("Placement precondition failed: {0}")]
    PlacementPrecondition(String),

    /// Symbology category does not match the builder's category
    #[error("Category mismatch: expected {expected:#X}, found {actual:#X}")]
    CategoryMismatch { expected: u64, actual: u64 },

    /// Identifier could not be remapped into the destination store
    #[error("Remap failed for {kind} {id:#X}")]
    RemapFailed { kind: &'static str, id: u64 },

    /// A discriminant that can never be constructed was observed
    #[error("Unreachable variant: {0}")]
    UnreachableVariant(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for geometry stream operations
pub type Result<T> = std::result::Result<T, GeomStreamError>;

impl From<String> for GeomStreamError {
    fn from(s: String) -> Self {
        GeomStreamError::Custom(s)
    }
}

impl From<&str> for GeomStreamError {
    fn from(s: &str) -> Self {
        GeomStreamError::Custom(s.to_string())
    }
}

/// Build an [`GeomStreamError::UnreachableVariant`].
///
/// Fatal in debug builds; in release the caller receives the error and
/// degrades to a failure result.
pub fn unreachable_variant(what: &str) -> GeomStreamError {
    tracing::warn!(target: "geomstream::error", what, "unreachable variant observed");
    debug_assert!(false, "unreachable variant: {what}");
    GeomStreamError::UnreachableVariant(what.to_string())
}
