//! Sequential typed reads and writes over in-memory buffers
//!
//! Shapes files switch byte order with the container version, so both
//! [`ByteReader`] and [`ByteWriter`] carry an [`Endian`] chosen at
//! construction rather than a type parameter.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::error::{Error, Result};

/// Byte order of multi-byte values in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    fn u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(buf),
            Endian::Big => BigEndian::read_u16(buf),
        }
    }

    fn u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(buf),
            Endian::Big => BigEndian::read_u32(buf),
        }
    }

    fn put_u16(self, buf: &mut [u8], value: u16) {
        match self {
            Endian::Little => LittleEndian::write_u16(buf, value),
            Endian::Big => BigEndian::write_u16(buf, value),
        }
    }

    fn put_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Endian::Little => LittleEndian::write_u32(buf, value),
            Endian::Big => BigEndian::write_u32(buf, value),
        }
    }
}

/// Number of bytes needed to move `position` up to a multiple of `alignment`.
pub fn padding_for(position: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - position % alignment) % alignment
}

// ============================================================================
// Reader
// ============================================================================

/// Forward-only reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Borrow the next `count` bytes and advance past them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndOfBuffer`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::EndOfBuffer {
                offset: self.pos,
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Consume everything left in the buffer.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(self.endian.u16(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(self.endian.u32(bytes))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read a null-terminated Latin-1 string. The terminator is consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndOfBuffer`] if no terminator is found.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(Error::EndOfBuffer {
                offset: self.pos,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let bytes = self.read_bytes(len + 1)?;
        Ok(bytes[..len].iter().map(|&b| char::from(b)).collect())
    }

    /// Skip to the next multiple of `alignment`, returning the skipped bytes.
    ///
    /// The padding content is not validated.
    pub fn align(&mut self, alignment: usize) -> Result<&'a [u8]> {
        let padding = padding_for(self.pos, alignment);
        self.read_bytes(padding)
    }

    /// Read 16-bit words until a nonzero one appears.
    ///
    /// Returns the nonzero word and how many zero words preceded it.
    pub fn read_nonzero_u16(&mut self) -> Result<(u16, usize)> {
        let mut skipped = 0;
        loop {
            let word = self.read_u16()?;
            if word != 0 {
                return Ok((word, skipped));
            }
            skipped += 1;
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Growable output buffer, the mirror image of [`ByteReader`].
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub fn new(endian: Endian) -> Self {
        Self { buf: Vec::new(), endian }
    }

    pub fn with_capacity(endian: Endian, capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), endian }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        self.endian.put_u16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        self.endian.put_u32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    /// Write a Latin-1 string followed by a null terminator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the string contains a NUL or a
    /// character outside Latin-1.
    pub fn write_cstring(&mut self, value: &str) -> Result<()> {
        for c in value.chars() {
            match u8::try_from(u32::from(c)) {
                Ok(b) if b != 0 => self.buf.push(b),
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "{value:?} cannot be written as a null-terminated Latin-1 string"
                    )));
                }
            }
        }
        self.buf.push(0);
        Ok(())
    }

    /// Pad to the next multiple of `alignment`.
    ///
    /// `recorded` is the padding captured when the data was read; it is
    /// reused when its length still fits, otherwise zeros are written.
    pub fn pad_to(&mut self, alignment: usize, recorded: &[u8]) {
        let padding = padding_for(self.buf.len(), alignment);
        if recorded.len() == padding {
            self.buf.extend_from_slice(recorded);
        } else {
            self.buf.resize(self.buf.len() + padding, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_endianness() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(ByteReader::new(&data, Endian::Little).read_u32().unwrap(), 0x04030201);
        assert_eq!(ByteReader::new(&data, Endian::Big).read_u32().unwrap(), 0x01020304);
        assert_eq!(ByteReader::new(&data, Endian::Big).read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_end_of_buffer() {
        let data = [0u8; 3];
        let mut reader = ByteReader::new(&data, Endian::Little);
        reader.read_u8().unwrap();
        match reader.read_u32() {
            Err(Error::EndOfBuffer { offset, needed, available }) => {
                assert_eq!((offset, needed, available), (1, 4, 2));
            }
            other => panic!("expected EndOfBuffer, got {other:?}"),
        }
        // A failed read does not move the cursor
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_cstring_latin1() {
        let data = b"caf\xe9\0rest";
        let mut reader = ByteReader::new(data, Endian::Little);
        assert_eq!(reader.read_cstring().unwrap(), "caf\u{e9}");
        assert_eq!(reader.position(), 5);

        let mut writer = ByteWriter::new(Endian::Little);
        writer.write_cstring("caf\u{e9}").unwrap();
        assert_eq!(writer.into_inner(), b"caf\xe9\0");
    }

    #[test]
    fn test_cstring_unterminated() {
        let mut reader = ByteReader::new(b"abc", Endian::Little);
        assert!(matches!(reader.read_cstring(), Err(Error::EndOfBuffer { .. })));
    }

    #[test]
    fn test_write_cstring_rejects_wide_chars() {
        let mut writer = ByteWriter::new(Endian::Little);
        assert!(writer.write_cstring("\u{2603}").is_err());
        assert!(writer.write_cstring("a\0b").is_err());
    }

    #[test]
    fn test_align_returns_skipped_bytes() {
        let data = [1, 0xAA, 0xBB, 0xCC, 5];
        let mut reader = ByteReader::new(&data, Endian::Little);
        reader.read_u8().unwrap();
        assert_eq!(reader.align(4).unwrap(), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(reader.position(), 4);
        // Already aligned
        assert!(reader.align(4).unwrap().is_empty());
    }

    #[test]
    fn test_nonzero_u16_skips_zero_words() {
        for zeros in 0..5 {
            let mut writer = ByteWriter::new(Endian::Big);
            for _ in 0..zeros {
                writer.write_u16(0);
            }
            writer.write_u16(42);
            let data = writer.into_inner();
            let mut reader = ByteReader::new(&data, Endian::Big);
            assert_eq!(reader.read_nonzero_u16().unwrap(), (42, zeros));
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn test_pad_to_reuses_recorded_padding() {
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write_u8(1);
        writer.pad_to(4, &[7, 8, 9]);
        writer.write_u8(2);
        writer.pad_to(4, &[7]);
        assert_eq!(writer.into_inner(), vec![1, 7, 8, 9, 2, 0, 0, 0]);
    }
}
