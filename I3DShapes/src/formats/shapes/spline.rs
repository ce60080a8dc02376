//! Spline payload codec
//!
//! After the [`PartHeader`]: opaque `flags` (u32), `point_count` (u32),
//! `point_count` control points as `[f32; 3]`, then any trailing bytes.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::utils::{ByteReader, ByteWriter, Endian};

use super::PartHeader;

/// Decoded control points of a spline part.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineGeometry {
    pub header: PartHeader,
    pub flags: u32,
    pub points: Vec<Vec3>,
    pub trailing: Vec<u8>,
}

impl SplineGeometry {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn decode(raw: &[u8], endian: Endian) -> Result<Self> {
        let mut reader = ByteReader::new(raw, endian);
        let header = PartHeader::decode(&mut reader)?;
        let flags = reader.read_u32()?;
        let point_count = reader.read_u32()? as usize;

        // Reject before allocating for a garbage count
        if point_count.saturating_mul(12) > reader.remaining() {
            return Err(Error::EndOfBuffer {
                offset: reader.position(),
                needed: point_count.saturating_mul(12),
                available: reader.remaining(),
            });
        }
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            points.push(reader.read_vec3()?);
        }
        let trailing = reader.read_rest().to_vec();

        Ok(Self { header, flags, points, trailing })
    }

    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(endian, 32 + self.points.len() * 12);
        self.header.encode(&mut writer)?;
        writer.write_u32(self.flags);
        writer.write_u32(self.points.len() as u32);
        for &point in &self.points {
            writer.write_vec3(point);
        }
        writer.write_bytes(&self.trailing);
        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> SplineGeometry {
        SplineGeometry {
            header: PartHeader::new(2, "road", 7),
            flags: 1,
            points: vec![Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.5, 0.0, 8.25)],
            trailing: vec![9],
        }
    }

    #[test]
    fn test_decode_encode() {
        let bytes = curve().encode(Endian::Big).unwrap();
        let decoded = SplineGeometry::decode(&bytes, Endian::Big).unwrap();
        assert_eq!(decoded.name(), "road");
        assert_eq!(decoded.id(), 7);
        assert_eq!(decoded.points, curve().points);
        assert_eq!(decoded.trailing, vec![9]);
        // "road\0" after the tag ends on an odd offset
        assert_eq!(decoded.header.name_padding, vec![0]);
        assert_eq!(decoded.encode(Endian::Big).unwrap(), bytes);
    }

    #[test]
    fn test_point_count_overrun() {
        let mut bytes = curve().encode(Endian::Little).unwrap();
        bytes.truncate(bytes.len() - 6);
        assert!(matches!(
            SplineGeometry::decode(&bytes, Endian::Little),
            Err(Error::EndOfBuffer { .. })
        ));
    }
}
