//! Synthetic shapes containers for integration tests

#![allow(dead_code)]

use glam::{Vec2, Vec3};
use i3dshapes::formats::shapes::{
    ENTITY_SHAPE, ENTITY_SPLINE, FileHeader, PartHeader, SeedCipher, ShapeGeometry, ShapeOpaque,
    SplineGeometry,
};
use i3dshapes::utils::{ByteWriter, Endian};

/// A shape with `vertex_count` vertices on a ring and `triangle_count`
/// triangles fanning around it.
pub fn shape(name: &str, id: u16, vertex_count: usize, triangle_count: usize) -> ShapeGeometry {
    let positions: Vec<Vec3> = (0..vertex_count)
        .map(|i| {
            let angle = i as f32 * 0.1;
            Vec3::new(angle.cos(), (i % 7) as f32 * 0.25, angle.sin())
        })
        .collect();
    let normals = positions
        .iter()
        .map(|p| Vec3::new(p.x, 0.5, p.z).normalize())
        .collect();
    let uvs = (0..vertex_count)
        .map(|i| Vec2::new(i as f32 / vertex_count as f32, 0.5))
        .collect();
    let triangles = (0..triangle_count)
        .map(|t| {
            let a = (t % vertex_count) as u32;
            let b = ((t + 1) % vertex_count) as u32;
            let c = ((t + 2) % vertex_count) as u32;
            [a, b, c]
        })
        .collect();

    ShapeGeometry {
        header: PartHeader::new(0x0001_0000, name, id),
        triangles,
        positions,
        normals: Some(normals),
        uv_channels: vec![uvs],
        opaque: ShapeOpaque {
            bounds: [0.0, 1.0, 0.0, 1.5],
            count_a: 1,
            count_b: 2,
            count_c: 0,
            uv_entry_count: 1,
            count_d: 0,
            vertex_count_2: vertex_count as u32,
            index_padding: Vec::new(),
            trailing: Vec::new(),
        },
    }
}

pub fn spline(name: &str, id: u16, point_count: usize) -> SplineGeometry {
    SplineGeometry {
        header: PartHeader::new(0x0002_0000, name, id),
        flags: 0,
        points: (0..point_count)
            .map(|i| Vec3::new(i as f32, 0.0, (i * i) as f32 * 0.1))
            .collect(),
        trailing: Vec::new(),
    }
}

pub fn endian_for(version: u8) -> Endian {
    FileHeader::new(version, 0).unwrap().endian()
}

pub fn shape_part(version: u8, shape: &ShapeGeometry) -> (u32, Vec<u8>) {
    (ENTITY_SHAPE, shape.encode(endian_for(version)).unwrap())
}

pub fn spline_part(version: u8, spline: &SplineGeometry) -> (u32, Vec<u8>) {
    (ENTITY_SPLINE, spline.encode(endian_for(version)).unwrap())
}

/// Assemble and encrypt a container. `header_seed` is what the header
/// claims; `seed` is what the payload is actually encrypted with.
pub fn container_with_header_seed(
    version: u8,
    seed: u8,
    header_seed: u8,
    parts: &[(u32, Vec<u8>)],
    trailing: &[u8],
) -> Vec<u8> {
    let header = FileHeader::new(version, header_seed).unwrap();
    let mut writer = ByteWriter::new(header.endian());
    writer.write_u32(parts.len() as u32);
    for (entity_type, raw) in parts {
        writer.write_u32(*entity_type);
        writer.write_u32(raw.len() as u32);
        writer.write_bytes(raw);
    }
    writer.write_bytes(trailing);

    let mut payload = writer.into_inner();
    SeedCipher::new(seed).unwrap().apply(&mut payload);
    [header.to_bytes().as_slice(), payload.as_slice()].concat()
}

pub fn container(version: u8, seed: u8, parts: &[(u32, Vec<u8>)], trailing: &[u8]) -> Vec<u8> {
    container_with_header_seed(version, seed, seed, parts, trailing)
}

/// Version 7, seed 153, 24 parts; the first is the 368-vertex,
/// 260-triangle "alphaShape" with id 20.
pub fn farm_container() -> Vec<u8> {
    let version = 7;
    let mut parts = vec![shape_part(version, &shape("alphaShape", 20, 368, 260))];
    for i in 1..24u16 {
        let part = match i % 4 {
            0 => spline_part(version, &spline(&format!("road{i}"), 20 + i, 5 + usize::from(i))),
            1 => {
                let mut s = shape(&format!("prop{i}Shape"), 20 + i, 12 + usize::from(i), 9);
                s.header.id_padding_words = usize::from(i % 3);
                shape_part(version, &s)
            }
            2 => {
                let mut s = shape(&format!("b{i}"), 20 + i, 30, 31);
                s.normals = None;
                s.opaque.trailing = vec![1, 2, 3];
                shape_part(version, &s)
            }
            _ => shape_part(version, &shape(&format!("odd{i}"), 20 + i, 3 * usize::from(i), 5)),
        };
        parts.push(part);
    }
    container(version, 153, &parts, &[0xAB, 0xCD, 0xEF])
}

/// Byte offset of the corner count inside an encoded shape part.
pub fn corner_count_offset(shape: &ShapeGeometry) -> usize {
    let name_end = 4 + shape.header.name.len() + 1;
    let aligned = name_end + name_end % 2;
    aligned + 2 * shape.header.id_padding_words + 2 + 16
}
