//! Spline export as a minimal I3D scene
//!
//! The document holds one cubic `NurbsCurve` whose control vertices are the
//! spline's points, plus a scene node referencing it, which is enough for
//! the GIANTS Editor to open.

use std::fs;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::Result;
use crate::formats::shapes::SplineGeometry;

const I3D_SCHEMA: &str = "http://i3d.giants.ch/schema/i3d-1.6.xsd";

/// Serialize `spline` as an I3D XML document.
pub fn spline_to_i3d(spline: &SplineGeometry) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("i3D");
    root.push_attribute(("name", spline.name()));
    root.push_attribute(("version", "1.6"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute(("xsi:noNamespaceSchemaLocation", I3D_SCHEMA));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("Asset")))?;
    let mut export = BytesStart::new("Export");
    export.push_attribute(("program", "i3dshapes"));
    export.push_attribute(("version", crate::VERSION));
    writer.write_event(Event::Empty(export))?;
    writer.write_event(Event::End(BytesEnd::new("Asset")))?;

    writer.write_event(Event::Empty(BytesStart::new("Files")))?;

    writer.write_event(Event::Start(BytesStart::new("Materials")))?;
    let mut material = BytesStart::new("Material");
    material.push_attribute(("name", "UnnamedMaterial"));
    material.push_attribute(("materialId", "1"));
    material.push_attribute(("diffuseColor", "1 1 1 1"));
    writer.write_event(Event::Empty(material))?;
    writer.write_event(Event::End(BytesEnd::new("Materials")))?;

    writer.write_event(Event::Start(BytesStart::new("Shapes")))?;
    let mut curve = BytesStart::new("NurbsCurve");
    curve.push_attribute(("name", "splineGeometry"));
    curve.push_attribute(("shapeId", "1"));
    curve.push_attribute(("type", "cubic"));
    curve.push_attribute(("degree", "3"));
    curve.push_attribute(("form", "open"));
    writer.write_event(Event::Start(curve))?;
    for point in &spline.points {
        let mut cv = BytesStart::new("cv");
        let coords = format!("{:.6} {:.6} {:.6}", point.x, point.y, point.z);
        cv.push_attribute(("c", coords.as_str()));
        writer.write_event(Event::Empty(cv))?;
    }
    writer.write_event(Event::End(BytesEnd::new("NurbsCurve")))?;
    writer.write_event(Event::End(BytesEnd::new("Shapes")))?;

    writer.write_event(Event::Empty(BytesStart::new("Dynamics")))?;

    writer.write_event(Event::Start(BytesStart::new("Scene")))?;
    let mut node = BytesStart::new("Shape");
    node.push_attribute(("shapeId", "1"));
    node.push_attribute(("name", spline.name()));
    node.push_attribute(("nodeId", "2"));
    writer.write_event(Event::Empty(node))?;
    writer.write_event(Event::End(BytesEnd::new("Scene")))?;

    writer.write_event(Event::End(BytesEnd::new("i3D")))?;

    let mut xml = String::from_utf8(output)?;
    xml.push('\n');
    Ok(xml)
}

/// Write `spline` to `path` as an I3D document.
pub fn write_spline_i3d<P: AsRef<Path>>(spline: &SplineGeometry, path: P) -> Result<()> {
    fs::write(path, spline_to_i3d(spline)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::shapes::PartHeader;
    use glam::Vec3;

    #[test]
    fn test_spline_document() {
        let spline = SplineGeometry {
            header: PartHeader::new(0, "fence", 3),
            flags: 0,
            points: vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.5, 0.0, 4.25)],
            trailing: Vec::new(),
        };
        let xml = spline_to_i3d(&spline).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<cv c=\"1.000000 2.000000 3.000000\"/>"));
        assert!(xml.contains("<cv c=\"-0.500000 0.000000 4.250000\"/>"));
        assert!(xml.contains("type=\"cubic\""));
        assert!(xml.contains("name=\"fence\""));
        assert_eq!(xml.matches("<cv ").count(), 2);
    }

    #[test]
    fn test_latin1_name_matches_declared_encoding() {
        let spline = SplineGeometry {
            header: PartHeader::new(0, "caf\u{e9}", 3),
            flags: 0,
            points: vec![Vec3::ZERO],
            trailing: Vec::new(),
        };
        let xml = spline_to_i3d(&spline).unwrap();
        assert!(xml.contains("encoding=\"UTF-8\""));
        assert!(xml.contains("name=\"caf\u{e9}\""));
        assert!(xml.as_bytes().windows(2).any(|w| w == [0xC3, 0xA9]));
    }
}
