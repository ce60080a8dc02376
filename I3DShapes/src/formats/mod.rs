//! Binary file formats

pub mod shapes;

pub use shapes::{LoadOptions, ParseMode, ShapesFile};
