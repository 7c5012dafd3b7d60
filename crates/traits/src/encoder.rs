use crate::raster::Bitmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("I/O error while writing document: {0}")]
    Io(#[from] io::Error),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("document has not been started")]
    NotStarted,
}

impl From<image::ImageError> for EncodeError {
    fn from(err: image::ImageError) -> Self {
        EncodeError::Image(err.to_string())
    }
}

/// A page image already compressed for embedding.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    pub jpeg: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// A finished document, in memory or spooled to a temporary file.
#[derive(Debug)]
pub enum EncodedDocument {
    Memory(Vec<u8>),
    Spooled(File),
}

impl EncodedDocument {
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            EncodedDocument::Memory(bytes) => Ok(bytes),
            EncodedDocument::Spooled(mut file) => {
                let mut bytes = Vec::new();
                file.seek(SeekFrom::Start(0))?;
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    /// Streams the document into `out`, returning the number of bytes copied.
    pub fn copy_to<W: Write>(self, out: &mut W) -> io::Result<u64> {
        match self {
            EncodedDocument::Memory(bytes) => {
                out.write_all(&bytes)?;
                Ok(bytes.len() as u64)
            }
            EncodedDocument::Spooled(mut file) => {
                file.seek(SeekFrom::Start(0))?;
                io::copy(&mut file, out)
            }
        }
    }
}

/// One PDF under construction. Pages are only ever appended.
pub trait DocumentEncoder: Send {
    fn append_page(&mut self, page: &EncodedPage) -> Result<(), EncodeError>;

    fn page_count(&self) -> usize;

    /// Pushes any buffered bytes to the spool.
    fn flush(&mut self) -> Result<(), EncodeError>;

    fn finish(self: Box<Self>) -> Result<EncodedDocument, EncodeError>;
}

pub trait EncoderFactory: Send + Sync {
    fn begin(&self) -> Result<Box<dyn DocumentEncoder>, EncodeError>;

    /// Compresses a captured page. CPU bound; callers run it off the async task.
    fn encode_page(&self, bitmap: &Bitmap, quality: f32) -> Result<EncodedPage, EncodeError>;

    fn name(&self) -> &'static str;
}
