//! Utility functions

pub mod cursor;
pub mod path;

pub use cursor::{ByteReader, ByteWriter, Endian};
pub use path::{clean_file_name, strip_shapes_extension};
