//! Mesh and spline extraction

use std::path::Path;

use anyhow::Context;
use i3dshapes::extraction::{ExtractionOptions, extract_file_with_progress};
use i3dshapes::formats::shapes::LoadOptions;

pub fn execute(
    file: &Path,
    out: Option<&Path>,
    create_dir: bool,
    dump_binary: bool,
    transform: bool,
    load: LoadOptions,
) -> anyhow::Result<()> {
    if let Some(out) = out {
        anyhow::ensure!(out.is_dir(), "output directory {} does not exist", out.display());
    }

    let options = ExtractionOptions {
        output_dir: out.map(Path::to_path_buf),
        create_dir,
        dump_binary,
        transform,
        load,
    };

    let result = extract_file_with_progress(file, &options, &|step| tracing::debug!("{}", step))
        .with_context(|| format!("failed to extract {}", file.display()))?;

    println!("Version: {}, seed: {}", result.version, result.seed);
    println!("Wrote {} files to {}", result.files_written.len(), result.output_dir.display());
    if result.unmatched_scene_shapes > 0 {
        println!("{} scene shapes had no matching part", result.unmatched_scene_shapes);
    }
    if !result.skipped.is_empty() {
        println!("Skipped {} parts:", result.skipped.len());
        for reason in &result.skipped {
            println!("  {reason}");
        }
    }
    tracing::info!("Done");
    Ok(())
}
