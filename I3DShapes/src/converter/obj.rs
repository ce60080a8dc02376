//! Wavefront OBJ export

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use glam::{Mat4, Vec2, Vec3};

use crate::error::Result;
use crate::formats::shapes::ShapeGeometry;

/// Scale applied when exporting straight from a shapes file.
pub const SHAPES_ONLY_SCALE: f32 = 100.0;

/// An OBJ document ready to be written. Formatting happens in `Display`.
#[derive(Debug, Clone)]
pub struct WavefrontObj<'a> {
    pub name: String,
    pub geometry_name: String,
    pub scale: f32,
    pub triangles: &'a [[u32; 3]],
    pub positions: Cow<'a, [Vec3]>,
    pub normals: Option<Cow<'a, [Vec3]>>,
    /// First UV channel only.
    pub uvs: Option<&'a [Vec2]>,
}

fn geometry_name(name: &str) -> String {
    name.strip_suffix("Shape").unwrap_or(name).to_string()
}

impl<'a> WavefrontObj<'a> {
    /// Export a shape on its own, scaled by [`SHAPES_ONLY_SCALE`].
    ///
    /// `name` is the source file name; the group is named after the shape.
    pub fn from_shape(shape: &'a ShapeGeometry, name: &str) -> Self {
        Self {
            name: name.to_string(),
            geometry_name: geometry_name(shape.name()),
            scale: SHAPES_ONLY_SCALE,
            triangles: &shape.triangles,
            positions: Cow::Borrowed(shape.positions.as_slice()),
            normals: shape.normals.as_deref().map(Cow::Borrowed),
            uvs: shape.uvs(),
        }
    }

    /// Export a shape placed in an I3D scene, at scale 1.
    ///
    /// With a `transform`, positions are moved into world space and normals
    /// rotated to match.
    pub fn from_scene_shape(shape: &'a ShapeGeometry, name: &str, transform: Option<Mat4>) -> Self {
        let (positions, normals) = match transform {
            Some(matrix) => (
                Cow::Owned(shape.positions.iter().map(|&p| matrix.transform_point3(p)).collect()),
                shape.normals.as_ref().map(|normals| {
                    Cow::Owned(
                        normals
                            .iter()
                            .map(|&n| matrix.transform_vector3(n).normalize_or_zero())
                            .collect(),
                    )
                }),
            ),
            None => (
                Cow::Borrowed(shape.positions.as_slice()),
                shape.normals.as_deref().map(Cow::Borrowed),
            ),
        };
        Self {
            name: name.to_string(),
            geometry_name: geometry_name(name),
            scale: 1.0,
            triangles: &shape.triangles,
            positions,
            normals,
            uvs: shape.uvs(),
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl fmt::Display for WavefrontObj<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Wavefront OBJ file")?;
        writeln!(f, "# Creator: i3dshapes {}", crate::VERSION)?;
        writeln!(f, "# Name: {}", self.name)?;
        writeln!(f, "# Scale: {:.2}", self.scale)?;
        writeln!(f)?;
        writeln!(f, "g default")?;
        writeln!(f)?;

        for p in &*self.positions {
            let p = *p * self.scale;
            writeln!(f, "v {:.4} {:.4} {:.4}", p.x, p.y, p.z)?;
        }
        for uv in self.uvs.unwrap_or_default() {
            writeln!(f, "vt {:.6} {:.6}", uv.x, uv.y)?;
        }
        for n in self.normals.as_deref().unwrap_or_default() {
            writeln!(f, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }

        writeln!(f, "s off")?;
        writeln!(f, "g {}", self.geometry_name)?;

        let has_uv = self.uvs.is_some();
        let has_normal = self.normals.is_some();
        for triangle in self.triangles {
            write!(f, "f")?;
            for &index in triangle {
                // OBJ indices are 1-based
                let i = u64::from(index) + 1;
                match (has_uv, has_normal) {
                    (true, true) => write!(f, " {i}/{i}/{i}")?,
                    (true, false) => write!(f, " {i}/{i}")?,
                    (false, true) => write!(f, " {i}//{i}")?,
                    (false, false) => write!(f, " {i}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Write `shape` as a standalone OBJ file.
pub fn write_obj<P: AsRef<Path>>(shape: &ShapeGeometry, name: &str, path: P) -> Result<()> {
    WavefrontObj::from_shape(shape, name).write(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::shapes::{PartHeader, ShapeOpaque};

    fn triangle(normals: bool, uvs: bool) -> ShapeGeometry {
        ShapeGeometry {
            header: PartHeader::new(0, "leafShape", 4),
            triangles: vec![[0, 1, 2]],
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: normals.then(|| vec![Vec3::Z; 3]),
            uv_channels: if uvs {
                vec![vec![Vec2::ZERO, Vec2::X, Vec2::Y], vec![Vec2::ONE; 3]]
            } else {
                Vec::new()
            },
            opaque: ShapeOpaque::default(),
        }
    }

    #[test]
    fn test_obj_layout() {
        let shape = triangle(true, true);
        let text = WavefrontObj::from_shape(&shape, "map").to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.contains(&"# Name: map"));
        assert!(lines.contains(&"# Scale: 100.00"));
        assert!(lines.contains(&"v 100.0000 0.0000 0.0000"));
        assert!(lines.contains(&"vn 0.000000 0.000000 1.000000"));
        assert!(lines.contains(&"g leaf"));
        assert_eq!(lines.last(), Some(&"f 1/1/1 2/2/2 3/3/3"));
        // Only the first UV channel is exported
        assert_eq!(lines.iter().filter(|l| l.starts_with("vt ")).count(), 3);
    }

    #[test]
    fn test_face_formats() {
        let normals_only = triangle(true, false);
        let text = WavefrontObj::from_shape(&normals_only, "m").to_string();
        assert!(text.ends_with("f 1//1 2//2 3//3\n"));

        let uvs_only = triangle(false, true);
        let text = WavefrontObj::from_shape(&uvs_only, "m").to_string();
        assert!(text.ends_with("f 1/1 2/2 3/3\n"));

        let bare = triangle(false, false);
        let text = WavefrontObj::from_shape(&bare, "m").to_string();
        assert!(text.ends_with("f 1 2 3\n"));
    }

    #[test]
    fn test_scene_shape_transform() {
        let shape = triangle(true, false);
        let matrix = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let obj = WavefrontObj::from_scene_shape(&shape, "leafShape", Some(matrix));
        assert!((obj.scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(obj.geometry_name, "leaf");
        assert_eq!(obj.positions[1], Vec3::new(11.0, 0.0, 0.0));
        // Translation does not affect normals
        assert_eq!(obj.normals.as_deref().map(|n| n[0]), Some(Vec3::Z));
    }
}
