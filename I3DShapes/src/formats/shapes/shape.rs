//! Shape payload codec
//!
//! Layout after the [`PartHeader`]:
//!
//! ```text
//! bounds          [f32; 4]   opaque
//! corner_count    u32        3 x triangle count
//! count_a         u32        opaque
//! vertex_count    u32
//! count_b         u32        opaque
//! count_c         u32        opaque
//! uv_entry_count  u32        opaque
//! count_d         u32        opaque
//! vertex_count_2  u32        usually equal to vertex_count, kept as read
//! indices         u16 x corner_count (u32 above 65536 vertices)
//! padding         up to the next 4-byte boundary of the part
//! positions       [f32; 3] x vertex_count
//! normals         [f32; 3] x vertex_count     only if enough bytes remain
//! uv channels     [f32; 2] x vertex_count     repeated while bytes remain
//! trailing        [u8]                        kept verbatim
//! ```

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::{ByteReader, ByteWriter, Endian};

use super::PartHeader;

/// Above this many vertices indices are stored as u32.
pub const WIDE_INDEX_THRESHOLD: usize = 65536;

/// A normal is valid when its squared length is within this of 1.0.
pub const NORMAL_TOLERANCE: f32 = 0.05;

/// Fields that are preserved but not interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeOpaque {
    pub bounds: [f32; 4],
    pub count_a: u32,
    pub count_b: u32,
    pub count_c: u32,
    pub uv_entry_count: u32,
    pub count_d: u32,
    /// Secondary vertex count; a mismatch with the real count is tolerated.
    pub vertex_count_2: u32,
    /// Bytes skipped by the 4-byte alignment after the indices.
    #[serde(skip)]
    pub index_padding: Vec<u8>,
    /// Bytes after the last complete UV channel.
    #[serde(skip)]
    pub trailing: Vec<u8>,
}

/// Decoded mesh of a shape part.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub header: PartHeader,
    pub triangles: Vec<[u32; 3]>,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uv_channels: Vec<Vec<Vec2>>,
    pub opaque: ShapeOpaque,
}

/// Non-fatal plausibility checks on decoded geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeDiagnostics {
    pub out_of_range_indices: usize,
    pub total_normals: usize,
    pub valid_normals: usize,
    pub first_normal_valid: bool,
    pub last_normal_valid: bool,
    pub vertex_count_mismatch: bool,
}

impl ShapeDiagnostics {
    /// Share of normals with unit length, 1.0 when there are none.
    pub fn normal_ratio(&self) -> f32 {
        if self.total_normals == 0 {
            1.0
        } else {
            self.valid_normals as f32 / self.total_normals as f32
        }
    }
}

/// Whether `normal` has (approximately) unit length.
pub fn is_valid_normal(normal: Vec3) -> bool {
    (normal.length_squared() - 1.0).abs() < NORMAL_TOLERANCE
}

fn wide_indices(vertex_count: usize) -> bool {
    vertex_count > WIDE_INDEX_THRESHOLD
}

impl ShapeGeometry {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn corner_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// First UV channel, the only one mesh exporters use.
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uv_channels.first().map(Vec::as_slice)
    }

    /// Decode a shape from its part bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if the corner count is not a
    /// multiple of 3, and [`Error::EndOfBuffer`] if the payload is short.
    pub fn decode(raw: &[u8], endian: Endian) -> Result<Self> {
        let mut reader = ByteReader::new(raw, endian);
        let header = PartHeader::decode(&mut reader)?;

        let mut opaque = ShapeOpaque::default();
        for value in &mut opaque.bounds {
            *value = reader.read_f32()?;
        }
        let corner_count = reader.read_u32()? as usize;
        opaque.count_a = reader.read_u32()?;
        let vertex_count = reader.read_u32()? as usize;
        opaque.count_b = reader.read_u32()?;
        opaque.count_c = reader.read_u32()?;
        opaque.uv_entry_count = reader.read_u32()?;
        opaque.count_d = reader.read_u32()?;
        opaque.vertex_count_2 = reader.read_u32()?;

        if corner_count % 3 != 0 {
            return Err(Error::InvalidGeometry(format!(
                "shape {:?}: corner count {} is not a multiple of 3",
                header.name, corner_count
            )));
        }

        let index_size = if wide_indices(vertex_count) { 4 } else { 2 };
        let needed = corner_count.saturating_mul(index_size);
        if needed > reader.remaining() {
            return Err(Error::EndOfBuffer {
                offset: reader.position(),
                needed,
                available: reader.remaining(),
            });
        }
        let mut triangles = Vec::with_capacity(corner_count / 3);
        for _ in 0..corner_count / 3 {
            let mut triangle = [0u32; 3];
            for index in &mut triangle {
                *index = if index_size == 4 {
                    reader.read_u32()?
                } else {
                    u32::from(reader.read_u16()?)
                };
            }
            triangles.push(triangle);
        }

        opaque.index_padding = reader.align(4)?.to_vec();

        let vertex_bytes = vertex_count.saturating_mul(12);
        if vertex_bytes > reader.remaining() {
            return Err(Error::EndOfBuffer {
                offset: reader.position(),
                needed: vertex_bytes,
                available: reader.remaining(),
            });
        }
        let positions = read_vec3s(&mut reader, vertex_count)?;

        let normals = if vertex_count > 0 && reader.remaining() >= vertex_bytes {
            Some(read_vec3s(&mut reader, vertex_count)?)
        } else {
            None
        };

        let mut uv_channels = Vec::new();
        while vertex_count > 0 && reader.remaining() >= vertex_count * 8 {
            let mut channel = Vec::with_capacity(vertex_count);
            for _ in 0..vertex_count {
                channel.push(reader.read_vec2()?);
            }
            uv_channels.push(channel);
        }

        opaque.trailing = reader.read_rest().to_vec();

        if opaque.vertex_count_2 as usize != vertex_count {
            tracing::debug!(
                "shape {:?}: secondary vertex count {} differs from {}",
                header.name,
                opaque.vertex_count_2,
                vertex_count
            );
        }

        Ok(Self { header, triangles, positions, normals, uv_channels, opaque })
    }

    /// Encode back to part bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if per-vertex arrays disagree in
    /// length or an index does not fit the on-disk index width.
    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>> {
        let vertex_count = self.vertex_count();
        self.check_lengths()?;
        let wide = wide_indices(vertex_count);

        let mut writer = ByteWriter::with_capacity(endian, 64 + vertex_count * 32);
        self.header.encode(&mut writer)?;

        for &value in &self.opaque.bounds {
            writer.write_f32(value);
        }
        writer.write_u32(self.corner_count() as u32);
        writer.write_u32(self.opaque.count_a);
        writer.write_u32(vertex_count as u32);
        writer.write_u32(self.opaque.count_b);
        writer.write_u32(self.opaque.count_c);
        writer.write_u32(self.opaque.uv_entry_count);
        writer.write_u32(self.opaque.count_d);
        writer.write_u32(self.opaque.vertex_count_2);

        for &index in self.triangles.iter().flatten() {
            if wide {
                writer.write_u32(index);
            } else {
                let narrow = u16::try_from(index).map_err(|_| {
                    Error::InvalidGeometry(format!(
                        "shape {:?}: index {} does not fit 16-bit indices",
                        self.header.name, index
                    ))
                })?;
                writer.write_u16(narrow);
            }
        }

        writer.pad_to(4, &self.opaque.index_padding);

        for &position in &self.positions {
            writer.write_vec3(position);
        }
        for &normal in self.normals.iter().flatten() {
            writer.write_vec3(normal);
        }
        for &uv in self.uv_channels.iter().flatten() {
            writer.write_vec2(uv);
        }
        writer.write_bytes(&self.opaque.trailing);

        Ok(writer.into_inner())
    }

    fn check_lengths(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        let normals_ok = self.normals.as_ref().is_none_or(|n| n.len() == vertex_count);
        let uvs_ok = self.uv_channels.iter().all(|c| c.len() == vertex_count);
        if normals_ok && uvs_ok {
            Ok(())
        } else {
            Err(Error::InvalidGeometry(format!(
                "shape {:?}: per-vertex arrays do not all have {} entries",
                self.header.name, vertex_count
            )))
        }
    }

    /// Run the non-fatal geometry checks.
    pub fn diagnose(&self) -> ShapeDiagnostics {
        let vertex_count = self.vertex_count();
        let out_of_range_indices = self
            .triangles
            .iter()
            .flatten()
            .filter(|&&i| i as usize >= vertex_count)
            .count();

        let normals = self.normals.as_deref().unwrap_or_default();
        ShapeDiagnostics {
            out_of_range_indices,
            total_normals: normals.len(),
            valid_normals: normals.iter().filter(|&&n| is_valid_normal(n)).count(),
            first_normal_valid: normals.first().is_some_and(|&n| is_valid_normal(n)),
            last_normal_valid: normals.last().is_some_and(|&n| is_valid_normal(n)),
            vertex_count_mismatch: self.opaque.vertex_count_2 as usize != vertex_count,
        }
    }
}

fn read_vec3s(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<Vec3>> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(reader.read_vec3()?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quad() -> ShapeGeometry {
        ShapeGeometry {
            header: PartHeader::new(0, "quadShape", 3),
            triangles: vec![[0, 1, 2], [2, 1, 3]],
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            normals: Some(vec![Vec3::Z; 4]),
            uv_channels: vec![vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE]],
            opaque: ShapeOpaque { vertex_count_2: 4, ..ShapeOpaque::default() },
        }
    }

    #[test]
    fn test_decode_encode_quad() {
        for endian in [Endian::Little, Endian::Big] {
            let shape = quad();
            let bytes = shape.encode(endian).unwrap();
            let decoded = ShapeGeometry::decode(&bytes, endian).unwrap();
            assert_eq!(decoded.vertex_count(), 4);
            assert_eq!(decoded.corner_count(), 6);
            assert_eq!(decoded.uv_channels.len(), 1);
            assert_eq!(decoded.opaque.index_padding.len(), 0);
            assert_eq!(decoded.encode(endian).unwrap(), bytes);
        }
    }

    #[test]
    fn test_index_padding_after_odd_triangle_count() {
        let mut shape = quad();
        shape.triangles.pop();
        let bytes = shape.encode(Endian::Little).unwrap();
        let decoded = ShapeGeometry::decode(&bytes, Endian::Little).unwrap();
        // 3 u16 indices leave the cursor 2 bytes short of a boundary
        assert_eq!(decoded.opaque.index_padding, vec![0, 0]);
        assert_eq!(decoded.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_missing_normals_and_trailing_bytes() {
        let mut shape = quad();
        shape.normals = None;
        shape.uv_channels.clear();
        shape.opaque.trailing = vec![0xDE, 0xAD];
        let bytes = shape.encode(Endian::Little).unwrap();
        let decoded = ShapeGeometry::decode(&bytes, Endian::Little).unwrap();
        assert!(decoded.normals.is_none());
        assert!(decoded.uv_channels.is_empty());
        assert_eq!(decoded.opaque.trailing, vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_corner_count_must_divide_by_three() {
        let bytes = quad().encode(Endian::Little).unwrap();
        // corner count sits after tag, "quadShape\0", id and bounds
        let offset = 4 + 10 + 2 + 16;
        let mut broken = bytes.clone();
        broken[offset..offset + 4].copy_from_slice(&5u32.to_le_bytes());
        assert!(matches!(
            ShapeGeometry::decode(&broken, Endian::Little),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_truncated_positions() {
        let bytes = quad().encode(Endian::Little).unwrap();
        let cut = &bytes[..bytes.len() - 4 * (12 + 8) - 1];
        assert!(matches!(
            ShapeGeometry::decode(cut, Endian::Little),
            Err(Error::EndOfBuffer { .. })
        ));
    }

    #[test]
    fn test_wide_indices_above_threshold() {
        let vertex_count = WIDE_INDEX_THRESHOLD + 1;
        let shape = ShapeGeometry {
            header: PartHeader::new(0, "big", 1),
            triangles: vec![[0, 1, 65536]],
            positions: vec![Vec3::ZERO; vertex_count],
            normals: None,
            uv_channels: Vec::new(),
            opaque: ShapeOpaque::default(),
        };
        let bytes = shape.encode(Endian::Little).unwrap();
        let decoded = ShapeGeometry::decode(&bytes, Endian::Little).unwrap();
        assert_eq!(decoded.triangles, vec![[0, 1, 65536]]);
        assert!(decoded.diagnose().vertex_count_mismatch);
    }

    #[test]
    fn test_narrow_index_overflow_rejected() {
        let mut shape = quad();
        shape.triangles[0][0] = 70000;
        assert!(matches!(shape.encode(Endian::Little), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_mismatched_normals_rejected() {
        let mut shape = quad();
        shape.normals = Some(vec![Vec3::Z; 3]);
        assert!(matches!(shape.encode(Endian::Little), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_diagnose() {
        let mut shape = quad();
        shape.triangles.push([0, 1, 9]);
        if let Some(normals) = shape.normals.as_mut() {
            normals[3] = Vec3::new(0.0, 0.0, 2.0);
        }
        let diagnostics = shape.diagnose();
        assert_eq!(diagnostics.out_of_range_indices, 1);
        assert_eq!(diagnostics.valid_normals, 3);
        assert!(diagnostics.first_normal_valid);
        assert!(!diagnostics.last_normal_valid);
        assert!((diagnostics.normal_ratio() - 0.75).abs() < f32::EPSILON);
    }
}
