//! File-level extraction: shapes to OBJ, splines to I3D, parts to `.bin`
//!
//! The input is either a `.i3d.shapes` container or an `.i3d` scene. A
//! container with a sibling `.i3d` is treated as that scene, so exported
//! meshes get scene names and, optionally, world transforms.

use std::fs;
use std::path::{Path, PathBuf};

use crate::converter::{ProgressCallback, WavefrontObj, write_spline_i3d};
use crate::error::{Error, Result};
use crate::formats::shapes::{EntityType, LoadOptions, ShapesFile};
use crate::scene::{I3dScene, read_i3d};
use crate::utils::{clean_file_name, strip_shapes_extension};

/// Options for [`extract_file`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    /// Output folder; defaults to the input file's folder.
    pub output_dir: Option<PathBuf>,
    /// Write into an `extract_<file>` subfolder of the output folder.
    pub create_dir: bool,
    /// Also write every part's raw bytes.
    pub dump_binary: bool,
    /// Apply scene transforms to exported meshes.
    pub transform: bool,
    pub load: LoadOptions,
}

/// What [`extract_file`] produced.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub output_dir: PathBuf,
    pub seed: u8,
    pub version: u8,
    pub files_written: Vec<PathBuf>,
    /// Parts that could not be exported, with the reason.
    pub skipped: Vec<String>,
    /// Scene shapes whose id matched no part.
    pub unmatched_scene_shapes: usize,
}

/// How the input file is interpreted.
#[derive(Debug, Clone)]
enum Input {
    Scene { scene_path: PathBuf },
    Shapes { shapes_path: PathBuf },
}

fn resolve_input(path: &Path) -> Result<Input> {
    let lower = path.to_string_lossy().to_lowercase();
    if lower.ends_with(".i3d.shapes") {
        let candidate = path.with_extension("");
        if candidate.is_file() {
            tracing::info!("found matching scene {}", candidate.display());
            return Ok(Input::Scene { scene_path: candidate });
        }
        Ok(Input::Shapes { shapes_path: path.to_path_buf() })
    } else if lower.ends_with(".i3d") {
        Ok(Input::Scene { scene_path: path.to_path_buf() })
    } else {
        Err(Error::InvalidPath(path.to_path_buf()))
    }
}

/// Extract everything from `path`.
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractionOptions) -> Result<ExtractionResult> {
    extract_file_with_progress(path, options, &|_| {})
}

/// [`extract_file`] with a callback receiving each step.
pub fn extract_file_with_progress<P: AsRef<Path>>(
    path: P,
    options: &ExtractionOptions,
    progress: ProgressCallback,
) -> Result<ExtractionResult> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::InvalidPath(path.to_path_buf()));
    }

    match resolve_input(path)? {
        Input::Scene { scene_path } => {
            progress(&format!("Reading scene {}", scene_path.display()));
            let scene = read_i3d(&scene_path)?;
            let shapes_path = scene
                .shapes_file_path(&scene_path)
                .filter(|p| p.is_file())
                .ok_or_else(|| {
                    Error::InvalidScene(format!(
                        "{} has no usable externalShapesFile",
                        scene_path.display()
                    ))
                })?;

            progress(&format!("Loading {}", shapes_path.display()));
            let file = ShapesFile::read(&shapes_path, &options.load)?;
            let folder_name = if scene.name.is_empty() {
                strip_shapes_extension(&scene_path)
            } else {
                scene.name.clone()
            };
            let mut result = prepare(&file, path, &folder_name, options)?;
            export_scene_shapes(&scene, &file, options, &mut result, progress)?;
            export_splines(&file, &mut result, progress)?;
            Ok(result)
        }
        Input::Shapes { shapes_path } => {
            tracing::info!("no matching scene file, exporting raw shapes data");
            progress(&format!("Loading {}", shapes_path.display()));
            let file = ShapesFile::read(&shapes_path, &options.load)?;
            let base_name = strip_shapes_extension(&shapes_path);
            let mut result = prepare(&file, path, &base_name, options)?;
            export_shapes(&file, &base_name, &mut result, progress)?;
            export_splines(&file, &mut result, progress)?;
            Ok(result)
        }
    }
}

/// Create the output folder and write the binary dump if requested.
fn prepare(
    file: &ShapesFile,
    input: &Path,
    folder_name: &str,
    options: &ExtractionOptions,
) -> Result<ExtractionResult> {
    let base = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output_dir = if options.create_dir {
        let folder_name = Path::new(folder_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        base.join(clean_file_name(&format!("extract_{folder_name}")))
    } else {
        base
    };
    if !output_dir.as_os_str().is_empty() {
        fs::create_dir_all(&output_dir)?;
    }

    let mut result = ExtractionResult {
        output_dir,
        seed: file.seed(),
        version: file.version(),
        ..ExtractionResult::default()
    };

    if options.dump_binary {
        for (index, part) in file.parts().iter().enumerate() {
            let id = part.id().map_or_else(|| index.to_string(), |id| id.to_string());
            let file_name = format!(
                "{}_{}_{}.bin",
                part.entity_type().label(),
                part.name().unwrap_or("unknown"),
                id
            );
            let target = result.output_dir.join(clean_file_name(&file_name));
            fs::write(&target, part.raw())?;
            result.files_written.push(target);
        }
        tracing::info!("dumped {} parts", file.parts().len());
    }
    Ok(result)
}

fn export_shapes(
    file: &ShapesFile,
    base_name: &str,
    result: &mut ExtractionResult,
    progress: ProgressCallback,
) -> Result<()> {
    for part in file.shapes() {
        let shape = match part.shape() {
            Ok(shape) => shape,
            Err(e) => {
                skip(result, part.name().unwrap_or("<unnamed>"), &e);
                continue;
            }
        };
        let file_name = clean_file_name(&format!("{:03}_{}.obj", shape.id(), shape.name()));
        progress(&format!("Writing {file_name}"));
        let target = result.output_dir.join(file_name);
        WavefrontObj::from_shape(shape, base_name).write(&target)?;
        result.files_written.push(target);
    }
    Ok(())
}

fn export_scene_shapes(
    scene: &I3dScene,
    file: &ShapesFile,
    options: &ExtractionOptions,
    result: &mut ExtractionResult,
    progress: ProgressCallback,
) -> Result<()> {
    let links = scene.link(file);
    result.unmatched_scene_shapes = links.unmatched.len();

    for link in links.linked.iter().filter(|l| l.part.entity_type() == EntityType::Shape) {
        let shape = match link.part.shape() {
            Ok(shape) => shape,
            Err(e) => {
                skip(result, &link.node.name, &e);
                continue;
            }
        };
        let file_name = clean_file_name(&format!(
            "{:03}_{}_{}.obj",
            link.node.shape_id, link.node.name, link.node.node_id
        ));
        progress(&format!("Writing {file_name}"));
        let transform = options.transform.then_some(link.node.absolute_transform);
        let target = result.output_dir.join(file_name);
        WavefrontObj::from_scene_shape(shape, &link.node.name, transform).write(&target)?;
        result.files_written.push(target);
    }
    Ok(())
}

fn export_splines(
    file: &ShapesFile,
    result: &mut ExtractionResult,
    progress: ProgressCallback,
) -> Result<()> {
    for (index, part) in file.splines().enumerate() {
        let spline = match part.spline() {
            Ok(spline) => spline,
            Err(e) => {
                skip(result, part.name().unwrap_or("<unnamed>"), &e);
                continue;
            }
        };
        let file_name = format!("spline{}.i3d", index + 1);
        progress(&format!("Writing {file_name}"));
        let target = result.output_dir.join(file_name);
        write_spline_i3d(spline, &target)?;
        result.files_written.push(target);
    }
    Ok(())
}

fn skip(result: &mut ExtractionResult, name: &str, error: &Error) {
    tracing::warn!("skipping {:?}: {}", name, error);
    result.skipped.push(format!("{name}: {error}"));
}
