//! Byte-exact round-trip verification

use std::fs;
use std::path::PathBuf;

use i3dshapes::formats::shapes::{LoadOptions, ShapesFile};

pub fn execute(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for path in files {
        let data = fs::read(path)?;
        let outcome = ShapesFile::load(&data, &LoadOptions::default().lenient())
            .and_then(|file| Ok((file.seed(), file.parts().len(), file.encode()?)));

        match outcome {
            Ok((seed, parts, encoded)) if encoded == data => {
                println!("OK    {} (seed {}, {} parts)", path.display(), seed, parts);
            }
            Ok((seed, _, encoded)) => {
                let offset = encoded
                    .iter()
                    .zip(&data)
                    .position(|(a, b)| a != b)
                    .unwrap_or_else(|| encoded.len().min(data.len()));
                println!("DIFF  {} (seed {}, first difference at byte {})", path.display(), seed, offset);
                failed += 1;
            }
            Err(e) => {
                println!("ERROR {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{} of {} files round-trip exactly", files.len() - failed, files.len());
    anyhow::ensure!(failed == 0, "{failed} files failed verification");
    Ok(())
}
