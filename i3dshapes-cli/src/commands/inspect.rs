//! Shapes file inspection

use std::path::Path;

use anyhow::Context;
use i3dshapes::formats::shapes::{
    EntityType, HeaderLayout, LoadOptions, Part, PartPayload, ShapeDiagnostics, ShapesFile,
};
use serde::Serialize;

#[derive(Serialize)]
struct InspectReport {
    file: String,
    version: u8,
    layout: HeaderLayout,
    header_seed: u8,
    seed: u8,
    trailing_bytes: usize,
    parts: Vec<PartReport>,
}

#[derive(Serialize)]
struct PartReport {
    index: usize,
    kind: EntityType,
    id: Option<u16>,
    name: Option<String>,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum GeometryReport {
    Shape {
        vertices: usize,
        triangles: usize,
        uv_channels: usize,
        has_normals: bool,
        diagnostics: ShapeDiagnostics,
    },
    Spline {
        points: usize,
    },
}

fn part_report(index: usize, part: &Part) -> PartReport {
    let mut issue = part.issue().map(str::to_string);
    let geometry = match part.entity_type() {
        EntityType::Unknown(_) => None,
        _ => match part.payload() {
            Ok(PartPayload::Shape(shape)) => Some(GeometryReport::Shape {
                vertices: shape.vertex_count(),
                triangles: shape.triangles.len(),
                uv_channels: shape.uv_channels.len(),
                has_normals: shape.normals.is_some(),
                diagnostics: shape.diagnose(),
            }),
            Ok(PartPayload::Spline(spline)) => Some(GeometryReport::Spline {
                points: spline.points.len(),
            }),
            Err(e) => {
                issue.get_or_insert_with(|| e.to_string());
                None
            }
        },
    };
    PartReport {
        index,
        kind: part.entity_type(),
        id: part.id(),
        name: part.name().map(str::to_string),
        size: part.raw().len(),
        geometry,
        issue,
    }
}

pub fn execute(path: &Path, options: LoadOptions, json: bool) -> anyhow::Result<()> {
    let file = ShapesFile::read(path, &options)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let report = InspectReport {
        file: path.display().to_string(),
        version: file.version(),
        layout: file.header().layout,
        header_seed: file.header().seed,
        seed: file.seed(),
        trailing_bytes: file.trailing().len(),
        parts: file
            .parts()
            .iter()
            .enumerate()
            .map(|(i, part)| part_report(i, part))
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== Shapes File Inspector ===\n");
    println!("File: {}\n", report.file);

    println!("=== Header ===");
    println!("Version: {} ({:?} layout)", report.version, report.layout);
    if report.header_seed == report.seed {
        println!("Seed: {}", report.seed);
    } else {
        println!("Seed: {} (header says {})", report.seed, report.header_seed);
    }
    println!("Trailing bytes: {}\n", report.trailing_bytes);

    println!("=== Parts ({}) ===", report.parts.len());
    for part in &report.parts {
        print!(
            "[{:3}] {:<6} id={:<5} {:<32} {:>8} bytes",
            part.index,
            match part.kind {
                EntityType::Unknown(tag) => format!("?{tag}"),
                kind => kind.label().to_string(),
            },
            part.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            part.name.as_deref().unwrap_or("-"),
            part.size
        );
        match &part.geometry {
            Some(GeometryReport::Shape { vertices, triangles, uv_channels, has_normals, diagnostics }) => {
                print!(
                    "  {vertices} verts, {triangles} tris, {uv_channels} uv, normals {}",
                    if *has_normals {
                        format!("{:.0}% valid", diagnostics.normal_ratio() * 100.0)
                    } else {
                        "none".to_string()
                    }
                );
                if diagnostics.out_of_range_indices > 0 {
                    print!(", {} bad indices", diagnostics.out_of_range_indices);
                }
            }
            Some(GeometryReport::Spline { points }) => print!("  {points} points"),
            None => {}
        }
        if let Some(issue) = &part.issue {
            print!("  ! {issue}");
        }
        println!();
    }

    Ok(())
}
