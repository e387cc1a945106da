//! The geometry op-stream
//!
//! A stream is a flat sequence of envelopes:
//!
//! ```text
//! opcode:u32 LE | paddedLength:u32 LE | payload (zero padded to a multiple of 8)
//! ```
//!
//! [`Writer`] appends envelopes, [`Collection`] scans them back as
//! [`Operation`]s and [`Reader`] turns an operation into typed values.
//! Payload layouts live in [`codec`], built on [`payload`].

pub mod codec;
pub mod collection;
pub mod entry_id;
pub mod header;
pub mod opcode;
pub mod operation;
pub mod payload;
pub mod reader;
pub mod writer;

pub use codec::CompactBoundary;
pub use collection::{Collection, OperationIter};
pub use entry_id::{EntryIdKind, GeometryStreamEntryId};
pub use header::{HeaderFlags, STREAM_FORMAT_VERSION};
pub use opcode::OpCode;
pub use operation::{padded_length, Operation, OP_ALIGNMENT, OP_HEADER_SIZE};
pub use reader::Reader;
pub use writer::{validate_curve_vector, BRepAppendStatus, Writer};

/// A finished element or part stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeometryStream {
    data: Vec<u8>,
}

impl GeometryStream {
    pub fn new(data: Vec<u8>) -> Self {
        GeometryStream { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw operation scan over this stream
    pub fn collection(&self) -> Collection<'_> {
        Collection::new(&self.data)
    }

    /// Number of operations, including any that are not understood
    pub fn operation_count(&self) -> usize {
        self.collection().iter().count()
    }
}

impl From<Vec<u8>> for GeometryStream {
    fn from(data: Vec<u8>) -> Self {
        GeometryStream::new(data)
    }
}

impl From<Writer> for GeometryStream {
    fn from(writer: Writer) -> Self {
        GeometryStream::new(writer.into_bytes())
    }
}

impl AsRef<[u8]> for GeometryStream {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
