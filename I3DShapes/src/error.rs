//! Error types for `I3DShapes`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `I3DShapes` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be used for the requested operation.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    // ==================== Cursor Errors ====================
    /// A read ran past the end of the buffer.
    #[error("end of buffer: needed {needed} bytes at offset {offset}, {available} available")]
    EndOfBuffer {
        /// Cursor offset at which the read was attempted.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    // ==================== Container Errors ====================
    /// The container header carries a version this library does not know.
    #[error("unsupported shapes file header: {header:02X?}")]
    UnsupportedVersion {
        /// The raw header bytes.
        header: [u8; 4],
    },

    /// The payload does not look like a shapes container under the given seed.
    #[error("decryption failed: {0}")]
    DecryptFailure(String),

    /// Seed 255 is reserved and cannot key the cipher.
    #[error("seed {0} is out of range (0-254)")]
    SeedOutOfRange(u8),

    /// Brute-force recovery tried every seed without success.
    #[error("no seed in 0-254 produced a plausible shapes file")]
    SeedNotFound,

    // ==================== Geometry Errors ====================
    /// A geometry view was requested from a part that does not carry one.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A shape or spline payload is internally inconsistent.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    // ==================== Conversion Errors ====================
    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// The I3D scene file is structurally invalid.
    #[error("invalid I3D scene: {0}")]
    InvalidScene(String),

    /// Generated text was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means "wrong seed" rather than genuine corruption.
    ///
    /// Seed recovery treats these as a rejected candidate and moves on.
    pub fn is_seed_mismatch(&self) -> bool {
        matches!(
            self,
            Error::DecryptFailure(_) | Error::EndOfBuffer { .. } | Error::InvalidGeometry(_)
        )
    }
}

/// Result type alias for `I3DShapes` operations.
pub type Result<T> = std::result::Result<T, Error>;
