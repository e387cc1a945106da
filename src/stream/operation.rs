//! Operation envelope: `opcode:u32 LE | paddedLength:u32 LE | payload`

use super::OpCode;

/// Size of the envelope header
pub const OP_HEADER_SIZE: usize = 8;

/// Payload lengths are padded to this alignment
pub const OP_ALIGNMENT: usize = 8;

/// Round a payload length up to the envelope alignment
#[inline]
pub const fn padded_length(len: usize) -> usize {
    (len + OP_ALIGNMENT - 1) & !(OP_ALIGNMENT - 1)
}

/// One decoded envelope, borrowing its payload from the stream buffer.
///
/// `data` is the full padded payload. `code` keeps the raw opcode so that
/// unrecognized operations survive a verbatim copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation<'a> {
    pub opcode: OpCode,
    pub code: u32,
    pub data: &'a [u8],
}

impl<'a> Operation<'a> {
    pub fn new(opcode: OpCode, data: &'a [u8]) -> Self {
        Operation {
            opcode,
            code: opcode.value(),
            data,
        }
    }

    /// Envelope from a raw code as read off the wire
    pub fn from_raw(code: u32, data: &'a [u8]) -> Self {
        Operation {
            opcode: OpCode::from_u32(code),
            code,
            data,
        }
    }

    pub fn is_geometry_op(&self) -> bool {
        self.opcode.is_geometry_op()
    }

    /// Bytes this operation occupies in a stream
    pub fn encoded_len(&self) -> usize {
        OP_HEADER_SIZE + padded_length(self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_length() {
        assert_eq!(padded_length(0), 0);
        assert_eq!(padded_length(1), 8);
        assert_eq!(padded_length(8), 8);
        assert_eq!(padded_length(9), 16);
    }

    #[test]
    fn test_unknown_code_kept() {
        let op = Operation::from_raw(99, &[]);
        assert_eq!(op.opcode, OpCode::Invalid);
        assert_eq!(op.code, 99);
    }
}
