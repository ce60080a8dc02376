//! Plausibility checks for a candidate decryption

use super::{EntityType, ShapesFile};

/// Printable ASCII only (0x20-0x7E).
pub fn is_printable_ascii(text: &str) -> bool {
    text.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Whether every shape and spline part has a readable, printable ASCII name.
///
/// A wrong seed that happens to produce a structurally valid part table
/// still scrambles the names. Unknown entity types carry no name.
pub fn is_plausible(file: &ShapesFile) -> bool {
    file.parts()
        .iter()
        .filter(|p| !matches!(p.entity_type(), EntityType::Unknown(_)))
        .all(|p| p.name().is_some_and(is_printable_ascii))
}
