//! I3D XML scene files
//!
//! A `.i3d` scene references an external `.i3d.shapes` container and places
//! its parts in a node tree. Only what is needed to name and position
//! extracted geometry is read: the `Files` table, the external shapes file
//! reference, and every scene node carrying a `shapeId`.

mod reader;

pub use reader::{parse_i3d, read_i3d};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::formats::shapes::{Part, ShapesFile};

/// A scene node that references a shape by id.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneShape {
    pub name: String,
    pub node_id: u32,
    pub shape_id: u16,
    pub local_transform: Mat4,
    /// Parent transforms applied, root first.
    pub absolute_transform: Mat4,
}

/// The parts of an I3D scene relevant to shape extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct I3dScene {
    pub name: String,
    /// `fileId` → `filename` from the `Files` section.
    pub files: BTreeMap<u32, String>,
    /// `externalShapesFile` attribute of the `Shapes` section, as written.
    pub external_shapes_file: Option<String>,
    pub shapes: Vec<SceneShape>,
}

/// A scene shape paired with the container part it references.
#[derive(Debug, Clone, Copy)]
pub struct LinkedShape<'a> {
    pub node: &'a SceneShape,
    pub part: &'a Part,
}

/// Result of [`I3dScene::link`].
#[derive(Debug, Clone, Default)]
pub struct SceneLinks<'a> {
    pub linked: Vec<LinkedShape<'a>>,
    /// Scene shapes whose id matched no part.
    pub unmatched: Vec<&'a SceneShape>,
}

impl I3dScene {
    /// Resolve the external shapes file relative to the scene file's folder.
    ///
    /// The reference may be a file name or a `fileId` into the `Files` table.
    pub fn shapes_file_path(&self, scene_path: &Path) -> Option<PathBuf> {
        let reference = self.external_shapes_file.as_deref()?;
        let file_name = reference
            .parse::<u32>()
            .ok()
            .and_then(|id| self.files.get(&id))
            .map_or(reference, String::as_str);
        let base = scene_path.parent().unwrap_or_else(|| Path::new(""));
        Some(base.join(file_name.replace('\\', "/")))
    }

    /// Pair every scene shape with the part carrying its shape id.
    pub fn link<'a>(&'a self, file: &'a ShapesFile) -> SceneLinks<'a> {
        let mut links = SceneLinks::default();
        for node in &self.shapes {
            match file.part_by_id(node.shape_id) {
                Some(part) => links.linked.push(LinkedShape { node, part }),
                None => {
                    tracing::warn!(
                        "scene shape {:?} references missing shape id {}",
                        node.name,
                        node.shape_id
                    );
                    links.unmatched.push(node);
                }
            }
        }
        tracing::debug!(
            "linked {} of {} scene shapes",
            links.linked.len(),
            self.shapes.len()
        );
        links
    }
}
