//! # I3DShapes
//!
//! A pure-Rust library for GIANTS Engine `.i3d.shapes` containers, the
//! binary geometry files shipped alongside `.i3d` scenes.
//!
//! ## Features
//!
//! - **Container codec** - Decrypt, parse and byte-exactly re-encode shapes files
//! - **Seed recovery** - Find the payload seed by exhaustive search when the header's is wrong
//! - **Shapes and splines** - Triangles, positions, normals, UV channels and control points
//! - **Scene linking** - Attach `.i3d` node names and transforms to parts
//! - **Export** - Wavefront OBJ meshes and I3D spline documents
//!
//! ## Quick Start
//!
//! ### Loading a Shapes File
//!
//! ```no_run
//! use i3dshapes::formats::shapes::{LoadOptions, ShapesFile};
//!
//! // Uses the header seed, falling back to brute force
//! let file = ShapesFile::read("map.i3d.shapes", &LoadOptions::default())?;
//! println!("version {}, seed {}, {} parts", file.version(), file.seed(), file.parts().len());
//!
//! for part in file.shapes() {
//!     let shape = part.shape()?;
//!     println!("{} ({} vertices)", shape.name(), shape.vertex_count());
//! }
//!
//! // Re-encoding reproduces the input bytes
//! let bytes = file.encode()?;
//! # Ok::<(), i3dshapes::Error>(())
//! ```
//!
//! ### Extracting Meshes
//!
//! ```no_run
//! use i3dshapes::extraction::{ExtractionOptions, extract_file};
//!
//! let result = extract_file("map.i3d", &ExtractionOptions::default())?;
//! println!("wrote {} files", result.files_written.len());
//! # Ok::<(), i3dshapes::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use i3dshapes::prelude::*;
//!
//! let options = LoadOptions::default().lenient();
//! assert_eq!(options.mode, ParseMode::Lenient);
//! ```

pub mod converter;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod scene;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::formats::shapes::{
        EntityType, LoadOptions, ParseMode, Part, PartPayload, SeedCipher, ShapeGeometry,
        ShapesFile, SplineGeometry, recover_seed,
    };

    pub use crate::converter::{WavefrontObj, spline_to_i3d};
    pub use crate::extraction::{ExtractionOptions, ExtractionResult, extract_file};
    pub use crate::scene::{I3dScene, SceneShape, read_i3d};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
