//! Format conversion utilities
//!
//! This module turns decoded parts into portable files:
//! - Shapes → Wavefront OBJ
//! - Splines → minimal I3D XML holding one NURBS curve

pub mod obj;
pub mod spline_xml;

/// Progress callback type for conversion operations.
/// The callback receives a message describing the current step.
pub type ProgressCallback<'a> = &'a dyn Fn(&str);

pub use obj::{WavefrontObj, write_obj};
pub use spline_xml::{spline_to_i3d, write_spline_i3d};
