//! Little-endian structured payload encoding
//!
//! Every payload starts with a one-byte layout version. Fields are fixed
//! width or `u32`-count-prefixed sequences. Trailing bytes (envelope
//! padding) are ignored on read.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{GeomStreamError, Result};
use crate::types::{Matrix3, Range3d, Transform, Vector2, Vector3};

/// Layout version written at the start of every payload
pub const PAYLOAD_VERSION: u8 = 1;

/// Payload builder
#[derive(Debug, Default)]
pub struct PayloadWriter {
    data: Vec<u8>,
}

impl PayloadWriter {
    /// Writer with the version byte already in place
    pub fn new() -> Self {
        PayloadWriter {
            data: vec![PAYLOAD_VERSION],
        }
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

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.data.write_u8(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.data.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.data.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.data.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.data.write_u64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.data.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| GeomStreamError::Payload(format!("sequence too long: {count}")))?;
        self.write_u32(count)
    }

    pub fn write_point(&mut self, p: Vector3) -> Result<()> {
        self.write_f64(p.x)?;
        self.write_f64(p.y)?;
        self.write_f64(p.z)
    }

    pub fn write_point_2d(&mut self, p: Vector2) -> Result<()> {
        self.write_f64(p.x)?;
        self.write_f64(p.y)
    }

    pub fn write_points(&mut self, points: &[Vector3]) -> Result<()> {
        self.write_count(points.len())?;
        for p in points {
            self.write_point(*p)?;
        }
        Ok(())
    }

    pub fn write_points_2d(&mut self, points: &[Vector2]) -> Result<()> {
        self.write_count(points.len())?;
        for p in points {
            self.write_point_2d(*p)?;
        }
        Ok(())
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> Result<()> {
        self.write_count(values.len())?;
        for v in values {
            self.write_f64(*v)?;
        }
        Ok(())
    }

    pub fn write_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.write_count(values.len())?;
        for v in values {
            self.write_u32(*v)?;
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_count(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Row-major
    pub fn write_matrix(&mut self, m: &Matrix3) -> Result<()> {
        for row in &m.m {
            for v in row {
                self.write_f64(*v)?;
            }
        }
        Ok(())
    }

    pub fn write_transform(&mut self, t: &Transform) -> Result<()> {
        self.write_matrix(&t.matrix)?;
        self.write_point(t.translation)
    }

    pub fn write_range(&mut self, r: &Range3d) -> Result<()> {
        self.write_point(r.low)?;
        self.write_point(r.high)
    }
}

/// Payload cursor.
///
/// Every read failure becomes [`GeomStreamError::Payload`].
#[derive(Debug)]
pub struct PayloadReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> PayloadReader<'a> {
    /// Check the version byte and position after it
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = PayloadReader {
            cursor: Cursor::new(data),
        };
        let version = reader.read_u8()?;
        if version == 0 || version > PAYLOAD_VERSION {
            return Err(GeomStreamError::Payload(format!(
                "unsupported payload version {version}"
            )));
        }
        Ok(reader)
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn truncated(what: &str) -> GeomStreamError {
        GeomStreamError::Payload(format!("truncated payload reading {what}"))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| Self::truncated("u8"))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| Self::truncated("u16"))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| Self::truncated("u32"))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| Self::truncated("i32"))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| Self::truncated("u64"))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.cursor
            .read_f64::<LittleEndian>()
            .map_err(|_| Self::truncated("f64"))
    }

    /// Sequence count, rejected up front when the remaining bytes cannot
    /// hold `count` elements of `element_size`
    pub fn read_count(&mut self, element_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(element_size) > self.remaining() {
            return Err(GeomStreamError::Payload(format!(
                "sequence of {count} elements exceeds payload"
            )));
        }
        Ok(count)
    }

    pub fn read_point(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(self.read_f64()?, self.read_f64()?, self.read_f64()?))
    }

    pub fn read_point_2d(&mut self) -> Result<Vector2> {
        Ok(Vector2::new(self.read_f64()?, self.read_f64()?))
    }

    pub fn read_points(&mut self) -> Result<Vec<Vector3>> {
        let count = self.read_count(24)?;
        (0..count).map(|_| self.read_point()).collect()
    }

    pub fn read_points_2d(&mut self) -> Result<Vec<Vector2>> {
        let count = self.read_count(16)?;
        (0..count).map(|_| self.read_point_2d()).collect()
    }

    pub fn read_f64s(&mut self) -> Result<Vec<f64>> {
        let count = self.read_count(8)?;
        (0..count).map(|_| self.read_f64()).collect()
    }

    pub fn read_u32s(&mut self) -> Result<Vec<u32>> {
        let count = self.read_count(4)?;
        (0..count).map(|_| self.read_u32()).collect()
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let count = self.read_count(1)?;
        let start = self.cursor.position() as usize;
        let bytes = self.cursor.get_ref()[start..start + count].to_vec();
        self.cursor.set_position((start + count) as u64);
        Ok(bytes)
    }

    pub fn read_string(&mut self) -> Result<String> {
        String::from_utf8(self.read_bytes()?)
            .map_err(|e| GeomStreamError::Payload(format!("invalid utf-8 text: {e}")))
    }

    pub fn read_matrix(&mut self) -> Result<Matrix3> {
        let mut m = [[0.0; 3]; 3];
        for row in &mut m {
            for v in row.iter_mut() {
                *v = self.read_f64()?;
            }
        }
        Ok(Matrix3::from_rows(m[0], m[1], m[2]))
    }

    pub fn read_transform(&mut self) -> Result<Transform> {
        let matrix = self.read_matrix()?;
        let translation = self.read_point()?;
        Ok(Transform::from_matrix_and_translation(matrix, translation))
    }

    pub fn read_range(&mut self) -> Result<Range3d> {
        let low = self.read_point()?;
        let high = self.read_point()?;
        Ok(Range3d { low, high })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        let mut w = PayloadWriter::new();
        w.write_u32(7).unwrap();
        w.write_f64(-2.5).unwrap();
        w.write_string("abc").unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes[0], PAYLOAD_VERSION);

        let mut r = PayloadReader::new(&bytes).unwrap();
        assert_eq!(r.read_u32().unwrap(), 7);
        assert_eq!(r.read_f64().unwrap(), -2.5);
        assert_eq!(r.read_string().unwrap(), "abc");
    }

    #[test]
    fn test_truncated_is_payload_error() {
        let mut w = PayloadWriter::new();
        w.write_u32(1).unwrap();
        let bytes = w.into_bytes();
        let mut r = PayloadReader::new(&bytes[..3]).unwrap();
        assert!(matches!(r.read_u32(), Err(GeomStreamError::Payload(_))));
    }

    #[test]
    fn test_oversized_count_rejected() {
        let mut w = PayloadWriter::new();
        w.write_u32(1_000_000).unwrap();
        let bytes = w.into_bytes();
        let mut r = PayloadReader::new(&bytes).unwrap();
        assert!(r.read_points().is_err());
    }

    #[test]
    fn test_bad_version() {
        assert!(PayloadReader::new(&[0u8, 0, 0]).is_err());
        assert!(PayloadReader::new(&[]).is_err());
    }

    #[test]
    fn test_padding_ignored() {
        let mut w = PayloadWriter::new();
        w.write_u8(9).unwrap();
        let mut bytes = w.into_bytes();
        bytes.resize(8, 0);
        let mut r = PayloadReader::new(&bytes).unwrap();
        assert_eq!(r.read_u8().unwrap(), 9);
    }
}
