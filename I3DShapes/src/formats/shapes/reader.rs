//! Shapes container parsing

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::ByteReader;

use super::{
    EntityType, FileHeader, HEADER_SIZE, LoadOptions, PART_ENTRY_SIZE, ParseMode, Part,
    SeedCipher, ShapesFile, recovery, validate,
};

impl ShapesFile {
    /// Read and [`load`](Self::load) a shapes file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise see
    /// [`ShapesFile::load`].
    pub fn read<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        tracing::debug!("read {} bytes from {}", data.len(), path.as_ref().display());
        Self::load(&data, options)
    }

    /// Parse a container with a known seed.
    ///
    /// Uses `options.seed`, or the header's seed indicator when unset. No
    /// recovery is attempted.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVersion`] for an unknown header layout.
    /// - [`Error::DecryptFailure`] when the seed is unusable or the part
    ///   table is implausible.
    /// - [`Error::EndOfBuffer`] when the part table is truncated.
    /// - In strict mode, any shape or spline decode error.
    pub fn parse(data: &[u8], options: &LoadOptions) -> Result<Self> {
        let header = FileHeader::parse(data)?;
        let seed = options.seed.unwrap_or(header.seed);
        let cipher = SeedCipher::new(seed)
            .map_err(|e| Error::DecryptFailure(format!("cannot decrypt: {e}")))?;

        let payload = cipher.decrypt(&data[HEADER_SIZE..]);
        let mut reader = ByteReader::new(&payload, header.endian());

        let part_count = reader.read_u32()? as usize;
        if part_count.saturating_mul(PART_ENTRY_SIZE) > reader.remaining() {
            return Err(Error::DecryptFailure(format!(
                "part count {} does not fit in {} payload bytes (seed {})",
                part_count,
                reader.remaining(),
                seed
            )));
        }

        let mut parts = Vec::with_capacity(part_count);
        for index in 0..part_count {
            let entity_type = EntityType::from_u32(reader.read_u32()?);
            let size = reader.read_u32()? as usize;
            let raw = reader.read_bytes(size)?.to_vec();
            let part = Part::from_raw(entity_type, raw, header.endian(), options.mode)?;
            tracing::debug!(
                "part {}: {} {:?} id={:?} ({} bytes)",
                index,
                entity_type.label(),
                part.name().unwrap_or(""),
                part.id(),
                size
            );
            parts.push(part);
        }
        let trailing = reader.read_rest().to_vec();

        Ok(Self { header, seed, parts, trailing })
    }

    /// Parse a container, recovering the seed if necessary.
    ///
    /// With an explicit `options.seed` this is [`parse`](Self::parse). Without
    /// one, the header's seed indicator is tried first; if the result is
    /// implausible every seed from 0 to 254 is tried. Once a seed is
    /// accepted, the container is parsed in `options.mode` and strict-mode
    /// errors surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeedNotFound`] when recovery exhausts all seeds,
    /// otherwise see [`ShapesFile::parse`].
    pub fn load(data: &[u8], options: &LoadOptions) -> Result<Self> {
        if options.seed.is_some() {
            return Self::parse(data, options);
        }

        let header = FileHeader::parse(data)?;
        let seed = if header_seed_works(data, header.seed)? {
            header.seed
        } else {
            tracing::debug!(
                "header seed {} does not decrypt this file, searching all seeds",
                header.seed
            );
            match recovery::recover_seed(data)? {
                Some(seed) => seed,
                None => {
                    tracing::warn!("no matching seed found");
                    return Err(Error::SeedNotFound);
                }
            }
        };

        Self::parse(data, &options.with_seed(seed))
    }
}

/// Whether the header's own seed yields a plausible structural parse.
fn header_seed_works(data: &[u8], seed: u8) -> Result<bool> {
    let options = LoadOptions { seed: Some(seed), mode: ParseMode::Lenient };
    match ShapesFile::parse(data, &options) {
        Ok(file) => Ok(validate::is_plausible(&file)),
        Err(e) if e.is_seed_mismatch() => Ok(false),
        Err(e) => Err(e),
    }
}
