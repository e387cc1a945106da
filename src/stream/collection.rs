//! Raw operation scan over a stream buffer

use byteorder::{ByteOrder, LittleEndian};

use super::operation::{padded_length, Operation, OP_HEADER_SIZE};

/// Restartable view over an encoded stream
#[derive(Debug, Clone, Copy)]
pub struct Collection<'a> {
    data: &'a [u8],
}

impl<'a> Collection<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Collection { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> OperationIter<'a> {
        OperationIter {
            data: self.data,
            offset: 0,
        }
    }

    /// Operations paired with the byte offset of their envelope
    pub fn operations_with_offsets(&self) -> impl Iterator<Item = (usize, Operation<'a>)> + 'a {
        let mut iter = self.iter();
        std::iter::from_fn(move || {
            let offset = iter.offset;
            iter.next().map(|op| (offset, op))
        })
    }
}

impl<'a> IntoIterator for Collection<'a> {
    type Item = Operation<'a>;
    type IntoIter = OperationIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Collection<'a> {
    type Item = Operation<'a>;
    type IntoIter = OperationIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over envelopes.
///
/// A truncated header or a length that runs past the buffer ends the scan.
#[derive(Debug, Clone)]
pub struct OperationIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> OperationIter<'a> {
    /// Byte offset of the next envelope
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for OperationIter<'a> {
    type Item = Operation<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let remaining = &self.data[self.offset..];
        if remaining.len() < OP_HEADER_SIZE {
            tracing::debug!(
                target: "geomstream::collection",
                offset = self.offset,
                remaining = remaining.len(),
                "truncated operation header"
            );
            self.offset = self.data.len();
            return None;
        }

        let code = LittleEndian::read_u32(&remaining[0..4]);
        let len = LittleEndian::read_u32(&remaining[4..8]) as usize;
        let end = OP_HEADER_SIZE.checked_add(len).filter(|end| *end <= remaining.len());
        let Some(end) = end else {
            tracing::debug!(
                target: "geomstream::collection",
                offset = self.offset,
                code,
                len,
                "operation length runs past end of stream"
            );
            self.offset = self.data.len();
            return None;
        };

        if len != padded_length(len) {
            tracing::debug!(target: "geomstream::collection", offset = self.offset, len, "unaligned operation length");
        }
        self.offset += end;
        Some(Operation::from_raw(code, &remaining[OP_HEADER_SIZE..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{OpCode, Writer};

    #[test]
    fn test_empty() {
        assert_eq!(Collection::new(&[]).iter().count(), 0);
    }

    #[test]
    fn test_truncated_header_stops() {
        let mut writer = Writer::new(true);
        writer.append_op(OpCode::Header, &[1, 2, 3]);
        let mut bytes = writer.into_bytes();
        bytes.extend_from_slice(&[9, 0, 0]);
        assert_eq!(Collection::new(&bytes).iter().count(), 1);
    }

    #[test]
    fn test_length_past_end_stops() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(&64u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(Collection::new(&bytes).iter().count(), 0);
    }

    #[test]
    fn test_offsets_aligned() {
        let mut writer = Writer::new(true);
        writer.append_op(OpCode::Header, &[1]);
        writer.append_op(OpCode::Material, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        writer.append_op(OpCode::Pattern, &[]);
        let bytes = writer.into_bytes();
        let offsets: Vec<usize> = Collection::new(&bytes)
            .operations_with_offsets()
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(offsets, vec![0, 16, 40]);
    }
}
