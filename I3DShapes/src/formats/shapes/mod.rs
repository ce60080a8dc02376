//! `.i3d.shapes` container format
//!
//! A shapes file is a 4-byte header followed by an obfuscated payload:
//!
//! ```text
//! header   [u8; 4]           version + seed indicator (see header.rs)
//! payload  (encrypted)
//!   part_count  u32
//!   part_count x { entity_type u32, size u32, raw [u8; size] }
//!   trailing    [u8]         kept verbatim
//! ```
//!
//! Multi-byte values are little-endian from version 4 on and big-endian
//! before. Parsing keeps every part's raw bytes, so
//! `encode(parse(bytes)) == bytes` holds for any file that parses.

mod cipher;
mod header;
mod part;
mod reader;
mod recovery;
mod shape;
mod spline;
mod validate;
mod writer;

pub use cipher::{RESERVED_SEED, SeedCipher};
pub use header::{FileHeader, HeaderLayout};
pub use part::{Part, PartHeader, PartPayload};
pub use recovery::{recover_seed, recover_seed_with_progress};
pub use shape::{ShapeDiagnostics, ShapeGeometry, ShapeOpaque};
pub use spline::SplineGeometry;
pub use validate::{is_plausible, is_printable_ascii};

use serde::Serialize;

/// Size of the unencrypted header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Size of one part-table entry header (`entity_type` + `size`).
pub const PART_ENTRY_SIZE: usize = 8;

/// Entity type tags used in the part table.
pub const ENTITY_SHAPE: u32 = 1;
pub const ENTITY_SPLINE: u32 = 2;

/// Kind of payload a part carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    Shape,
    Spline,
    /// Any other tag; the part is carried as raw bytes only.
    Unknown(u32),
}

impl EntityType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            ENTITY_SHAPE => EntityType::Shape,
            ENTITY_SPLINE => EntityType::Spline,
            other => EntityType::Unknown(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            EntityType::Shape => ENTITY_SHAPE,
            EntityType::Spline => ENTITY_SPLINE,
            EntityType::Unknown(tag) => tag,
        }
    }

    /// Lowercase label used in file names and reports.
    pub fn label(self) -> &'static str {
        match self {
            EntityType::Shape => "shape",
            EntityType::Spline => "spline",
            EntityType::Unknown(_) => "part",
        }
    }
}

/// How payload decode failures are handled while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Decode every shape and spline up front; the first failure aborts.
    #[default]
    Strict,
    /// Log per-part failures, keep the raw bytes and carry on.
    Lenient,
}

/// Options for [`ShapesFile::parse`] and [`ShapesFile::load`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Seed to decrypt with. `None` uses the header's indicator and, for
    /// [`ShapesFile::load`], falls back to brute-force recovery.
    pub seed: Option<u8>,
    pub mode: ParseMode,
}

impl LoadOptions {
    pub fn with_seed(mut self, seed: u8) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn lenient(mut self) -> Self {
        self.mode = ParseMode::Lenient;
        self
    }
}

/// A parsed shapes container.
#[derive(Debug, Clone)]
pub struct ShapesFile {
    pub(crate) header: FileHeader,
    pub(crate) seed: u8,
    pub(crate) parts: Vec<Part>,
    pub(crate) trailing: Vec<u8>,
}

impl ShapesFile {
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn version(&self) -> u8 {
        self.header.version
    }

    /// Seed actually used to decrypt the payload.
    pub fn seed(&self) -> u8 {
        self.seed
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    /// Bytes after the last part, preserved verbatim.
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }

    /// Parts carrying shape geometry, in file order.
    pub fn shapes(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.entity_type() == EntityType::Shape)
    }

    pub fn splines(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.entity_type() == EntityType::Spline)
    }

    /// First shape or spline part with the given id.
    pub fn part_by_id(&self, id: u16) -> Option<&Part> {
        self.parts
            .iter()
            .find(|p| p.header().is_some_and(|h| h.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_tags() {
        assert_eq!(EntityType::from_u32(1), EntityType::Shape);
        assert_eq!(EntityType::from_u32(2), EntityType::Spline);
        assert_eq!(EntityType::from_u32(9), EntityType::Unknown(9));
        for tag in 0..8 {
            assert_eq!(EntityType::from_u32(tag).as_u32(), tag);
        }
    }
}
