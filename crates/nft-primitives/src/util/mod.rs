//! Byte-level wire utilities: variable-length integers and little-endian
//! readers/writers for the Bitcoin serialization format.

use crate::PrimitivesError;

/// A Bitcoin variable-length integer.
///
/// Values below 0xfd are encoded in a single byte; larger values get a
/// marker byte (0xfd/0xfe/0xff) followed by 2, 4, or 8 little-endian bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarInt(u64);

impl VarInt {
    /// The numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The encoded length in bytes (1, 3, 5, or 9).
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.0 {
            v @ 0..=0xfc => vec![v as u8],
            v @ 0xfd..=0xffff => {
                let mut buf = vec![0xfd];
                buf.extend_from_slice(&(v as u16).to_le_bytes());
                buf
            }
            v @ 0x1_0000..=0xffff_ffff => {
                let mut buf = vec![0xfe];
                buf.extend_from_slice(&(v as u32).to_le_bytes());
                buf
            }
            v => {
                let mut buf = vec![0xff];
                buf.extend_from_slice(&v.to_le_bytes());
                buf
            }
        }
    }
}

impl From<u64> for VarInt {
    fn from(value: u64) -> Self {
        VarInt(value)
    }
}

impl From<usize> for VarInt {
    fn from(value: usize) -> Self {
        VarInt(value as u64)
    }
}

/// Sequential reader over a byte slice with little-endian accessors.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if self.remaining() < n {
            return Err(PrimitivesError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let first = self.read_u8()?;
        let value = match first {
            0..=0xfc => first as u64,
            0xfd => self.read_u16_le()? as u64,
            0xfe => self.read_u32_le()? as u64,
            0xff => self.read_u64_le()?,
        };
        Ok(VarInt(value))
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Growable byte buffer with little-endian writers.
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        WireWriter { buf: Vec::new() }
    }

    /// Create a writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        WireWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a variable-length integer.
    pub fn write_varint(&mut self, varint: VarInt) {
        self.buf.extend_from_slice(&varint.to_bytes());
    }

    /// Consume the writer, returning the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Current buffer length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_boundaries() {
        for (value, len) in [
            (0u64, 1usize),
            (0xfc, 1),
            (0xfd, 3),
            (0xffff, 3),
            (0x1_0000, 5),
            (0xffff_ffff, 5),
            (0x1_0000_0000, 9),
        ] {
            let v = VarInt::from(value);
            assert_eq!(v.length(), len, "length for {value:#x}");
            assert_eq!(v.to_bytes().len(), len, "encoding for {value:#x}");
        }
    }

    #[test]
    fn varint_roundtrip_through_reader() {
        for value in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, u64::MAX] {
            let bytes = VarInt::from(value).to_bytes();
            let mut reader = WireReader::new(&bytes);
            assert_eq!(reader.read_varint().unwrap().value(), value);
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn reader_eof_is_error() {
        let mut reader = WireReader::new(&[0x01, 0x02]);
        assert!(reader.read_u32_le().is_err());
    }

    #[test]
    fn writer_reader_roundtrip() {
        let mut writer = WireWriter::new();
        writer.write_u32_le(0xdead_beef);
        writer.write_varint(VarInt::from(300u64));
        writer.write_u64_le(42);
        writer.write_u8(7);

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_u32_le().unwrap(), 0xdead_beef);
        assert_eq!(reader.read_varint().unwrap().value(), 300);
        assert_eq!(reader.read_u64_le().unwrap(), 42);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.remaining(), 0);
    }
}
