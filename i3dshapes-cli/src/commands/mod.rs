use clap::Subcommand;
use std::path::PathBuf;

use i3dshapes::formats::shapes::{LoadOptions, ParseMode};

pub mod extract;
pub mod inspect;
pub mod seed;
pub mod verify;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract shapes as OBJ and splines as I3D from a .i3d or .i3d.shapes file
    Extract {
        /// Input .i3d.shapes or .i3d file
        file: PathBuf,

        /// Output directory (defaults to the input's folder)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write into an extract_<file> subfolder
        #[arg(short = 'd', long)]
        create_dir: bool,

        /// Also dump every part's raw bytes
        #[arg(short = 'b', long)]
        dump_binary: bool,

        /// Apply scene transforms to exported meshes
        #[arg(short, long)]
        transform: bool,

        /// Decryption seed (0-254); brute-forced when omitted
        #[arg(short, long)]
        seed: Option<u8>,

        /// Keep going past malformed parts
        #[arg(short, long)]
        lenient: bool,
    },

    /// Show the header, parts and geometry checks of a shapes file
    Inspect {
        /// Input .i3d.shapes file
        file: PathBuf,

        /// Decryption seed (0-254); brute-forced when omitted
        #[arg(short, long)]
        seed: Option<u8>,

        /// Keep going past malformed parts
        #[arg(short, long)]
        lenient: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that files re-encode to identical bytes
    Verify {
        /// Input .i3d.shapes files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Brute-force the decryption seed of a shapes file
    FindSeed {
        /// Input .i3d.shapes file
        file: PathBuf,
    },
}

fn load_options(seed: Option<u8>, lenient: bool) -> LoadOptions {
    LoadOptions {
        seed,
        mode: if lenient { ParseMode::Lenient } else { ParseMode::Strict },
    }
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Extract { file, out, create_dir, dump_binary, transform, seed, lenient } => {
                extract::execute(
                    file,
                    out.as_deref(),
                    *create_dir,
                    *dump_binary,
                    *transform,
                    load_options(*seed, *lenient),
                )
            }
            Commands::Inspect { file, seed, lenient, json } => {
                inspect::execute(file, load_options(*seed, *lenient), *json)
            }
            Commands::Verify { files } => verify::execute(files),
            Commands::FindSeed { file } => seed::execute(file),
        }
    }
}
