//! Utility types for binary serialization.
//!
//! Kaspa's consensus encodings are fixed-width little-endian integers with
//! variable byte strings prefixed by a u64 length. `ByteWriter` and
//! `ByteReader` implement that layout; `VarInt` is the compact length prefix
//! used by personal message hashing.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A compact variable-length integer (1, 3, 5 or 9 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Return the encoded byte length of this VarInt.
    ///
    /// # Returns
    /// 1, 3, 5, or 9 depending on the value.
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        let mut buf = Vec::with_capacity(self.length());
        match self.length() {
            1 => buf.push(v as u8),
            3 => {
                buf.push(0xfd);
                buf.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                buf.push(0xfe);
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        buf
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor over little-endian consensus data.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEof` if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a u64 length prefix followed by that many bytes.
    ///
    /// # Returns
    /// The byte string, or `LengthOverflow` if the prefix claims more bytes
    /// than remain.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_u64_le()?;
        if len > self.remaining() as u64 {
            return Err(PrimitivesError::LengthOverflow(len));
        }
        self.read_bytes(len as usize)
    }

    /// Read a u64 element count, bounded by the remaining data.
    ///
    /// Every element occupies at least `min_element_size` bytes, so a count
    /// that cannot fit is rejected before any allocation happens.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize, PrimitivesError> {
        let count = self.read_u64_le()?;
        let max = (self.remaining() / min_element_size.max(1)) as u64;
        if count > max {
            return Err(PrimitivesError::LengthOverflow(count));
        }
        Ok(count as usize)
    }

    /// Return the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// An append-only buffer producing little-endian consensus data.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) -> &mut Self {
        self.buf.push(val);
        self
    }

    /// Append a little-endian u16.
    pub fn write_u16_le(&mut self, val: u16) -> &mut Self {
        self.write_bytes(&val.to_le_bytes())
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) -> &mut Self {
        self.write_bytes(&val.to_le_bytes())
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) -> &mut Self {
        self.write_bytes(&val.to_le_bytes())
    }

    /// Append a u64 length prefix followed by `bytes`.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_u64_le(bytes.len() as u64);
        self.write_bytes(bytes)
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

/// Serialize byte vectors as lowercase hex strings.
///
/// Use with `#[serde(with = "kas_primitives::util::serde_hex")]`.
pub mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write bytes as a hex string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Read bytes from a hex string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- VarInt --

    #[test]
    fn test_varint_encoding() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (252, vec![0xfc]),
            (253, vec![0xfd, 0xfd, 0x00]),
            (65535, vec![0xfd, 0xff, 0xff]),
            (65536, vec![0xfe, 0x00, 0x00, 0x01, 0x00]),
            (4294967296, vec![0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]),
        ];
        for (value, expected) in cases {
            let vi = VarInt(value);
            assert_eq!(vi.to_bytes(), expected, "encoding of {}", value);
            assert_eq!(vi.length(), expected.len(), "length of {}", value);
        }
    }

    // -- ByteWriter / ByteReader --

    #[test]
    fn test_writer_layout_is_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u16_le(0x0102).write_u32_le(0x03040506);
        assert_eq!(writer.as_bytes(), &[0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn test_var_bytes_prefix_is_u64() {
        let mut writer = ByteWriter::new();
        writer.write_var_bytes(b"ab");
        assert_eq!(writer.into_bytes(), vec![2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b']);
    }

    #[test]
    fn test_reader_reads_back_writer_output() {
        let mut writer = ByteWriter::with_capacity(32);
        writer
            .write_u8(0x42)
            .write_u16_le(0x1234)
            .write_u32_le(0xDEADBEEF)
            .write_u64_le(0x0102030405060708)
            .write_var_bytes(b"hello");

        let data = writer.into_bytes();
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_var_bytes().unwrap(), b"hello");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_serde_hex() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "serde_hex")]
            data: Vec<u8>,
        }
        let w = Wrapper { data: vec![0xde, 0xad] };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"data":"dead"}"#);
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
        assert!(serde_json::from_str::<Wrapper>(r#"{"data":"xyz"}"#).is_err());
    }

    #[test]
    fn test_reader_eof() {
        let mut reader = ByteReader::new(&[0x01]);
        assert!(reader.read_u8().is_ok());
        assert!(matches!(reader.read_u8(), Err(PrimitivesError::UnexpectedEof)));
    }

    #[test]
    fn test_reader_rejects_oversized_length_prefix() {
        let mut data = u64::MAX.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            reader.read_var_bytes(),
            Err(PrimitivesError::LengthOverflow(u64::MAX))
        ));

        let mut reader = ByteReader::new(&data);
        assert!(reader.read_count(1).is_err());
    }
}
