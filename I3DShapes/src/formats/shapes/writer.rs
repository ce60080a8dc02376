//! Shapes container encoding

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::utils::ByteWriter;

use super::{HEADER_SIZE, PART_ENTRY_SIZE, SeedCipher, ShapesFile};

impl ShapesFile {
    /// Reassemble the container bytes.
    ///
    /// The header is written as read, every part contributes its current raw
    /// bytes, and the payload is re-encrypted with [`seed`](Self::seed).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let cipher = SeedCipher::new(self.seed)?;

        let parts_size: usize = self.parts.iter().map(|p| PART_ENTRY_SIZE + p.raw().len()).sum();
        let payload_size = 4 + parts_size + self.trailing.len();
        let mut writer = ByteWriter::with_capacity(self.header.endian(), payload_size);
        writer.write_u32(self.parts.len() as u32);
        for part in &self.parts {
            writer.write_u32(part.entity_type().as_u32());
            writer.write_u32(part.raw().len() as u32);
            writer.write_bytes(part.raw());
        }
        writer.write_bytes(&self.trailing);

        let mut payload = writer.into_inner();
        cipher.apply(&mut payload);

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Encode and write to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode()?;
        fs::write(path.as_ref(), &bytes)?;
        tracing::info!("wrote {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }
}
