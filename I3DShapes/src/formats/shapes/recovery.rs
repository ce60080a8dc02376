//! Brute-force seed recovery

use std::ops::ControlFlow;

use crate::error::Result;

use super::{LoadOptions, ParseMode, RESERVED_SEED, ShapesFile, validate};

/// Try every seed from 0 to 254 and return the first that decrypts `data`
/// into a plausible container.
///
/// # Errors
///
/// Only header-level errors (unsupported version, truncated header) are
/// returned; a rejected candidate is not an error. `Ok(None)` means no
/// seed matched.
pub fn recover_seed(data: &[u8]) -> Result<Option<u8>> {
    recover_seed_with_progress(data, |_| ControlFlow::Continue(()))
}

/// [`recover_seed`] with a callback invoked before each candidate.
///
/// Returning [`ControlFlow::Break`] from `progress` stops the search and
/// yields `Ok(None)`.
pub fn recover_seed_with_progress<F>(data: &[u8], mut progress: F) -> Result<Option<u8>>
where
    F: FnMut(u8) -> ControlFlow<()>,
{
    for seed in 0..RESERVED_SEED {
        if progress(seed).is_break() {
            tracing::debug!("seed search cancelled at {}", seed);
            return Ok(None);
        }

        let options = LoadOptions { seed: Some(seed), mode: ParseMode::Lenient };
        match ShapesFile::parse(data, &options) {
            Ok(file) if validate::is_plausible(&file) => {
                tracing::info!("found seed {} ({} parts)", seed, file.parts().len());
                return Ok(Some(seed));
            }
            Ok(_) => tracing::debug!("seed {}: part names are not printable", seed),
            Err(e) if e.is_seed_mismatch() => tracing::trace!("seed {}: {}", seed, e),
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}
