//! Parts: raw byte spans with a lazily decoded geometry view

use std::cell::OnceCell;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::{ByteReader, ByteWriter, Endian};

use super::{EntityType, ParseMode, ShapeGeometry, SplineGeometry};

/// Prefix shared by shape and spline payloads.
///
/// ```text
/// tag      u32       opaque
/// name     cstring   Latin-1, null-terminated
/// padding  [u8]      up to the next 2-byte boundary of the part
/// zeros    [u16]     any number of zero words
/// id       u16       first nonzero word
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartHeader {
    pub tag: u32,
    pub name: String,
    /// Bytes skipped by the 2-byte alignment after the name.
    #[serde(skip)]
    pub name_padding: Vec<u8>,
    /// Zero words that preceded the id.
    pub id_padding_words: usize,
    pub id: u16,
}

impl PartHeader {
    pub fn new(tag: u32, name: impl Into<String>, id: u16) -> Self {
        Self { tag, name: name.into(), name_padding: Vec::new(), id_padding_words: 0, id }
    }

    /// Read the prefix from the start of a part's bytes.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let tag = reader.read_u32()?;
        let name = reader.read_cstring()?;
        let name_padding = reader.align(2)?.to_vec();
        let (id, id_padding_words) = reader.read_nonzero_u16()?;
        Ok(Self { tag, name, name_padding, id_padding_words, id })
    }

    pub fn encode(&self, writer: &mut ByteWriter) -> Result<()> {
        if self.id == 0 {
            return Err(Error::InvalidGeometry(format!(
                "part {:?} has id 0, which cannot be stored",
                self.name
            )));
        }
        writer.write_u32(self.tag);
        writer.write_cstring(&self.name)?;
        writer.pad_to(2, &self.name_padding);
        for _ in 0..self.id_padding_words {
            writer.write_u16(0);
        }
        writer.write_u16(self.id);
        Ok(())
    }
}

/// Structured view of a part's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PartPayload {
    Shape(ShapeGeometry),
    Spline(SplineGeometry),
}

/// One entry of the part table.
///
/// `raw` is exactly what was read from the container and is what gets
/// written back. The geometry view is decoded on first access and cached;
/// edits go through [`Part::replace_shape`] / [`Part::replace_spline`],
/// which re-encode and swap both together.
#[derive(Debug, Clone)]
pub struct Part {
    entity_type: EntityType,
    endian: Endian,
    raw: Vec<u8>,
    header: Option<PartHeader>,
    issue: Option<String>,
    view: OnceCell<PartPayload>,
}

impl Part {
    /// Wrap a part's raw bytes, reading its header and, depending on
    /// `mode`, its geometry.
    ///
    /// # Errors
    ///
    /// In [`ParseMode::Strict`], any header or geometry decode error.
    /// [`ParseMode::Lenient`] records the problem on the part instead.
    pub fn from_raw(
        entity_type: EntityType,
        raw: Vec<u8>,
        endian: Endian,
        mode: ParseMode,
    ) -> Result<Self> {
        let mut part = Self {
            entity_type,
            endian,
            raw,
            header: None,
            issue: None,
            view: OnceCell::new(),
        };
        if let EntityType::Unknown(tag) = entity_type {
            tracing::debug!("keeping part with unknown entity type {} as raw bytes", tag);
            return Ok(part);
        }

        let header = PartHeader::decode(&mut ByteReader::new(&part.raw, endian));
        let decoded = match header {
            Ok(header) => {
                part.header = Some(header);
                part.payload().map(|_| ())
            }
            Err(e) => Err(e),
        };

        match (decoded, mode) {
            (Ok(()), _) => Ok(part),
            (Err(e), ParseMode::Strict) => Err(e),
            (Err(e), ParseMode::Lenient) => {
                tracing::warn!(
                    "skipping structured decode of {} {:?}: {}",
                    entity_type.label(),
                    part.name().unwrap_or("<unnamed>"),
                    e
                );
                part.issue = Some(e.to_string());
                Ok(part)
            }
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// The part's bytes exactly as they will be written.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn header(&self) -> Option<&PartHeader> {
        self.header.as_ref()
    }

    pub fn id(&self) -> Option<u16> {
        self.header.as_ref().map(|h| h.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.name.as_str())
    }

    /// Decode problem recorded during a lenient parse.
    pub fn issue(&self) -> Option<&str> {
        self.issue.as_deref()
    }

    /// Whether the geometry view has been decoded and cached.
    pub fn is_decoded(&self) -> bool {
        self.view.get().is_some()
    }

    /// Decode (or return the cached) geometry view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for parts of unknown type, or the
    /// decode error of a malformed payload.
    pub fn payload(&self) -> Result<&PartPayload> {
        if let Some(view) = self.view.get() {
            return Ok(view);
        }
        let payload = match self.entity_type {
            EntityType::Shape => PartPayload::Shape(ShapeGeometry::decode(&self.raw, self.endian)?),
            EntityType::Spline => {
                PartPayload::Spline(SplineGeometry::decode(&self.raw, self.endian)?)
            }
            EntityType::Unknown(tag) => {
                return Err(Error::InvalidArgument(format!(
                    "part with entity type {tag} has no geometry view"
                )));
            }
        };
        Ok(self.view.get_or_init(|| payload))
    }

    /// Shape geometry of this part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the part is not a shape.
    pub fn shape(&self) -> Result<&ShapeGeometry> {
        if self.entity_type != EntityType::Shape {
            return Err(self.wrong_view("shape"));
        }
        match self.payload()? {
            PartPayload::Shape(shape) => Ok(shape),
            PartPayload::Spline(_) => Err(self.wrong_view("shape")),
        }
    }

    /// Spline geometry of this part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the part is not a spline.
    pub fn spline(&self) -> Result<&SplineGeometry> {
        if self.entity_type != EntityType::Spline {
            return Err(self.wrong_view("spline"));
        }
        match self.payload()? {
            PartPayload::Spline(spline) => Ok(spline),
            PartPayload::Shape(_) => Err(self.wrong_view("spline")),
        }
    }

    /// Re-encode `shape` into this part's raw bytes.
    pub fn replace_shape(&mut self, shape: ShapeGeometry) -> Result<()> {
        if self.entity_type != EntityType::Shape {
            return Err(self.wrong_view("shape"));
        }
        let raw = shape.encode(self.endian)?;
        self.swap(raw, shape.header.clone(), PartPayload::Shape(shape));
        Ok(())
    }

    /// Re-encode `spline` into this part's raw bytes.
    pub fn replace_spline(&mut self, spline: SplineGeometry) -> Result<()> {
        if self.entity_type != EntityType::Spline {
            return Err(self.wrong_view("spline"));
        }
        let raw = spline.encode(self.endian)?;
        self.swap(raw, spline.header.clone(), PartPayload::Spline(spline));
        Ok(())
    }

    fn swap(&mut self, raw: Vec<u8>, header: PartHeader, payload: PartPayload) {
        self.raw = raw;
        self.header = Some(header);
        self.issue = None;
        self.view = OnceCell::from(payload);
    }

    fn wrong_view(&self, wanted: &str) -> Error {
        Error::InvalidArgument(format!(
            "{} part {:?} has no {} view",
            self.entity_type.label(),
            self.name().unwrap_or("<unnamed>"),
            wanted
        ))
    }
}
