//! Path utilities

use std::path::Path;

/// Characters rejected in file names on at least one common filesystem.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace characters that cannot appear in a file name with `_`.
pub fn clean_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// File name of `path` with a trailing `.shapes` and `.i3d` removed.
///
/// `map.i3d.shapes` and `map.i3d` both become `map`.
pub fn strip_shapes_extension<P: AsRef<Path>>(path: P) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    let mut end = name.len();
    if lower[..end].ends_with(".shapes") {
        end -= ".shapes".len();
    }
    if lower[..end].ends_with(".i3d") {
        end -= ".i3d".len();
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_file_name() {
        assert_eq!(clean_file_name("wheel:left/front"), "wheel_left_front");
        assert_eq!(clean_file_name("plain_name"), "plain_name");
    }

    #[test]
    fn test_strip_shapes_extension() {
        assert_eq!(strip_shapes_extension("maps/map.i3d.shapes"), "map");
        assert_eq!(strip_shapes_extension("map.I3D"), "map");
        assert_eq!(strip_shapes_extension("mesh.obj"), "mesh.obj");
    }
}
