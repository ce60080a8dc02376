//! Seed brute-forcing

use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

use i3dshapes::formats::shapes::{FileHeader, recover_seed_with_progress};

pub fn execute(path: &Path) -> anyhow::Result<()> {
    let data = fs::read(path)?;
    let header = FileHeader::parse(&data)?;
    println!("Version: {}, header seed: {}", header.version, header.seed);

    let found = recover_seed_with_progress(&data, |seed| {
        if seed % 32 == 0 {
            tracing::debug!("trying seeds {}..", seed);
        }
        ControlFlow::Continue(())
    })?;

    match found {
        Some(seed) => println!("Found seed: {seed}"),
        None => {
            tracing::warn!("Failed to find any matching seed for this file.");
            anyhow::bail!("no matching seed for {}", path.display());
        }
    }
    Ok(())
}
