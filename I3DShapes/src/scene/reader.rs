//! I3D XML reading

use std::fs;
use std::path::Path;

use glam::{EulerRot, Mat4, Quat, Vec3};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{I3dScene, SceneShape};
use crate::error::{Error, Result};

/// Read an I3D file from disk. Latin-1 files are accepted.
pub fn read_i3d<P: AsRef<Path>>(path: P) -> Result<I3dScene> {
    let bytes = fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    };
    parse_i3d(&content)
}

/// Parse I3D XML text.
///
/// # Errors
/// Returns an error if the XML is malformed or a transform attribute is not
/// three numbers.
pub fn parse_i3d(content: &str) -> Result<I3dScene> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut scene = I3dScene::default();
    let mut buf = Vec::new();
    let mut in_scene = false;
    // Absolute transforms of the open scene nodes
    let mut transform_stack: Vec<Mat4> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if in_scene {
                    let absolute = visit_node(&e, &transform_stack, &mut scene)?;
                    transform_stack.push(absolute);
                } else {
                    match e.name().as_ref() {
                        b"Scene" => in_scene = true,
                        other => read_section(other, &e, &mut scene)?,
                    }
                }
            }
            Event::Empty(e) => {
                if in_scene {
                    visit_node(&e, &transform_stack, &mut scene)?;
                } else {
                    read_section(e.name().as_ref(), &e, &mut scene)?;
                }
            }
            Event::End(e) => {
                if in_scene {
                    if e.name().as_ref() == b"Scene" && transform_stack.is_empty() {
                        in_scene = false;
                    } else {
                        transform_stack.pop();
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if in_scene {
        return Err(Error::InvalidScene("unterminated Scene element".to_string()));
    }
    Ok(scene)
}

/// Elements outside `<Scene>` that carry linking information.
fn read_section(name: &[u8], element: &BytesStart<'_>, scene: &mut I3dScene) -> Result<()> {
    match name {
        b"i3D" => {
            if let Some(value) = attribute(element, b"name")? {
                scene.name = value;
            }
        }
        b"File" => {
            let id = attribute(element, b"fileId")?.and_then(|v| v.parse().ok());
            let file_name = attribute(element, b"filename")?;
            if let (Some(id), Some(file_name)) = (id, file_name) {
                scene.files.insert(id, file_name);
            }
        }
        b"Shapes" => {
            scene.external_shapes_file = attribute(element, b"externalShapesFile")?;
        }
        _ => {}
    }
    Ok(())
}

/// Record a scene node and return its absolute transform.
fn visit_node(element: &BytesStart<'_>, parents: &[Mat4], scene: &mut I3dScene) -> Result<Mat4> {
    let local = local_transform(element)?;
    let absolute = parents.last().map_or(local, |parent| *parent * local);

    if let Some(shape_id) = attribute(element, b"shapeId")? {
        let shape_id = shape_id
            .parse()
            .map_err(|_| Error::InvalidScene(format!("invalid shapeId {shape_id:?}")))?;
        let node_id = attribute(element, b"nodeId")?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        scene.shapes.push(SceneShape {
            name: attribute(element, b"name")?.unwrap_or_default(),
            node_id,
            shape_id,
            local_transform: local,
            absolute_transform: absolute,
        });
    }
    Ok(absolute)
}

/// `translation`, `rotation` (degrees, XYZ) and `scale` of a node.
fn local_transform(element: &BytesStart<'_>) -> Result<Mat4> {
    let translation = vec3_attribute(element, b"translation")?.unwrap_or(Vec3::ZERO);
    let rotation = vec3_attribute(element, b"rotation")?.unwrap_or(Vec3::ZERO);
    let scale = vec3_attribute(element, b"scale")?.unwrap_or(Vec3::ONE);

    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        rotation.x.to_radians(),
        rotation.y.to_radians(),
        rotation.z.to_radians(),
    );
    Ok(Mat4::from_scale_rotation_translation(scale, rotation, translation))
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn vec3_attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<Vec3>> {
    let Some(value) = attribute(element, key)? else {
        return Ok(None);
    };
    let components: Vec<f32> = value
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| Error::InvalidScene(format!("invalid vector {value:?}")))?;
    match components.as_slice() {
        &[x, y, z] => Ok(Some(Vec3::new(x, y, z))),
        _ => Err(Error::InvalidScene(format!("expected 3 components, got {value:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"<?xml version="1.0" encoding="iso-8859-1"?>
<i3D name="farm" version="1.6">
  <Files>
    <File fileId="4" filename="farm.i3d.shapes"/>
  </Files>
  <Shapes externalShapesFile="farm.i3d.shapes">
  </Shapes>
  <Scene>
    <TransformGroup name="root" nodeId="1" translation="10 0 0">
      <Shape name="barnShape" shapeId="20" nodeId="2" translation="0 5 0"/>
      <TransformGroup name="turned" nodeId="3" rotation="0 90 0">
        <Shape name="door" shapeId="21" nodeId="4" translation="1 0 0"/>
      </TransformGroup>
    </TransformGroup>
    <Shape name="loose" shapeId="22" nodeId="5" scale="2 2 2"/>
  </Scene>
</i3D>
"#;

    #[test]
    fn test_parse_scene() {
        let scene = parse_i3d(SCENE).unwrap();
        assert_eq!(scene.name, "farm");
        assert_eq!(scene.files.get(&4).map(String::as_str), Some("farm.i3d.shapes"));
        assert_eq!(scene.external_shapes_file.as_deref(), Some("farm.i3d.shapes"));

        let ids: Vec<u16> = scene.shapes.iter().map(|s| s.shape_id).collect();
        assert_eq!(ids, vec![20, 21, 22]);
        assert_eq!(scene.shapes[0].name, "barnShape");
        assert_eq!(scene.shapes[0].node_id, 2);
    }

    #[test]
    fn test_absolute_transforms() {
        let scene = parse_i3d(SCENE).unwrap();

        let barn = scene.shapes[0].absolute_transform.transform_point3(Vec3::ZERO);
        assert!(barn.abs_diff_eq(Vec3::new(10.0, 5.0, 0.0), 1e-5));

        // +90 degrees about Y maps local +X onto world -Z
        let door = scene.shapes[1].absolute_transform.transform_point3(Vec3::ZERO);
        assert!(door.abs_diff_eq(Vec3::new(10.0, 0.0, -1.0), 1e-5), "{door}");

        let loose = scene.shapes[2].absolute_transform.transform_point3(Vec3::ONE);
        assert!(loose.abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }

    #[test]
    fn test_invalid_vector() {
        let xml = r#"<i3D><Scene><Shape shapeId="1" translation="1 2"/></Scene></i3D>"#;
        assert!(matches!(parse_i3d(xml), Err(Error::InvalidScene(_))));
    }

    #[test]
    fn test_shapes_file_path() {
        let scene = parse_i3d(SCENE).unwrap();
        let path = scene.shapes_file_path(Path::new("maps/farm.i3d")).unwrap();
        assert_eq!(path, Path::new("maps/farm.i3d.shapes"));
    }
}
