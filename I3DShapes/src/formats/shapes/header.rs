//! The 4-byte unencrypted container header

use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::Endian;

use super::HEADER_SIZE;

/// Where version and seed live inside the header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderLayout {
    /// Versions 4 and up: `[version, ?, seed, ?]`.
    Modern,
    /// Versions 2 and 3: `[?, seed, ?, version]`.
    Legacy,
}

/// Decoded container header. The raw bytes are kept for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub version: u8,
    /// Seed indicator stored in the file; not necessarily the working seed.
    pub seed: u8,
    pub layout: HeaderLayout,
    raw: [u8; HEADER_SIZE],
}

impl FileHeader {
    /// # Errors
    ///
    /// Returns [`Error::EndOfBuffer`] if fewer than 4 bytes are given and
    /// [`Error::UnsupportedVersion`] if neither layout matches.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(bytes) = data.get(..HEADER_SIZE) else {
            return Err(Error::EndOfBuffer {
                offset: 0,
                needed: HEADER_SIZE,
                available: data.len(),
            });
        };
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];

        if raw[0] >= 4 {
            Ok(Self { version: raw[0], seed: raw[2], layout: HeaderLayout::Modern, raw })
        } else if raw[3] == 2 || raw[3] == 3 {
            Ok(Self { version: raw[3], seed: raw[1], layout: HeaderLayout::Legacy, raw })
        } else {
            Err(Error::UnsupportedVersion { header: raw })
        }
    }

    /// Build a header for a fresh container, zeroing the opaque bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for versions below 2.
    pub fn new(version: u8, seed: u8) -> Result<Self> {
        match version {
            0 | 1 => Err(Error::UnsupportedVersion { header: [0, seed, 0, version] }),
            2 | 3 => Self::parse(&[0, seed, 0, version]),
            _ => Self::parse(&[version, 0, seed, 0]),
        }
    }

    /// Little-endian from version 4 on, big-endian before.
    pub fn endian(&self) -> Endian {
        if self.version >= 4 { Endian::Little } else { Endian::Big }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_header() {
        let header = FileHeader::parse(&[7, 0x11, 153, 0x22]).unwrap();
        assert_eq!(header.version, 7);
        assert_eq!(header.seed, 153);
        assert_eq!(header.layout, HeaderLayout::Modern);
        assert_eq!(header.endian(), Endian::Little);
        assert_eq!(header.to_bytes(), [7, 0x11, 153, 0x22]);
    }

    #[test]
    fn test_legacy_header() {
        let header = FileHeader::parse(&[0x01, 42, 0x20, 3, 0xFF]).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.seed, 42);
        assert_eq!(header.layout, HeaderLayout::Legacy);
        assert_eq!(header.endian(), Endian::Big);
        assert_eq!(header.to_bytes(), [0x01, 42, 0x20, 3]);
    }

    #[test]
    fn test_modern_layout_wins_over_legacy_version_byte() {
        // b0 >= 4 is checked first, even when b3 looks like a legacy version
        for b3 in [2, 3] {
            let header = FileHeader::parse(&[7, 42, 0x20, b3]).unwrap();
            assert_eq!(header.layout, HeaderLayout::Modern);
            assert_eq!(header.version, 7);
            assert_eq!(header.seed, 0x20);
        }
    }

    #[test]
    fn test_unsupported_header() {
        assert!(matches!(
            FileHeader::parse(&[1, 2, 3, 9]),
            Err(Error::UnsupportedVersion { header: [1, 2, 3, 9] })
        ));
        assert!(matches!(FileHeader::parse(&[7, 0]), Err(Error::EndOfBuffer { .. })));
    }

    #[test]
    fn test_new_round_trips_through_parse() {
        for version in 2..=7 {
            let header = FileHeader::new(version, 99).unwrap();
            let reparsed = FileHeader::parse(&header.to_bytes()).unwrap();
            assert_eq!(reparsed, header);
            assert_eq!(reparsed.seed, 99);
        }
    }
}
