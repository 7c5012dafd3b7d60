use crate::jpeg::encode_jpeg;
use crate::writer::StreamingPdfWriter;
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Seek, Write};
use std::path::PathBuf;
use ticketpress_traits::{
    Bitmap, DocumentEncoder, EncodeError, EncodedDocument, EncodedPage, EncoderFactory,
};
use ticketpress_types::Size;

const PDF_VERSION: &str = "1.7";

/// Where a document's bytes accumulate while pages are appended.
pub trait SpoolTarget: Write + Seek + Send + 'static {
    fn into_document(self) -> io::Result<EncodedDocument>;
}

impl SpoolTarget for Cursor<Vec<u8>> {
    fn into_document(self) -> io::Result<EncodedDocument> {
        Ok(EncodedDocument::Memory(self.into_inner()))
    }
}

impl SpoolTarget for BufWriter<File> {
    fn into_document(self) -> io::Result<EncodedDocument> {
        let file = self.into_inner().map_err(|e| e.into_error())?;
        Ok(EncodedDocument::Spooled(file))
    }
}

pub struct LopdfEncoder<W: SpoolTarget> {
    writer: StreamingPdfWriter<W>,
}

impl<W: SpoolTarget> LopdfEncoder<W> {
    pub fn new(target: W) -> Result<Self, EncodeError> {
        let writer = StreamingPdfWriter::new(target, PDF_VERSION, Size::a4().to_points())?;
        Ok(Self { writer })
    }
}

impl<W: SpoolTarget> DocumentEncoder for LopdfEncoder<W> {
    fn append_page(&mut self, page: &EncodedPage) -> Result<(), EncodeError> {
        self.writer
            .write_image_page(&page.jpeg, page.width_px, page.height_px)?;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    fn flush(&mut self) -> Result<(), EncodeError> {
        Ok(self.writer.flush()?)
    }

    fn finish(self: Box<Self>) -> Result<EncodedDocument, EncodeError> {
        let pages = self.writer.page_count();
        let target = self.writer.finish()?;
        debug!("Finished PDF with {} pages", pages);
        Ok(target.into_document()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpoolMode {
    #[default]
    Memory,
    /// Anonymous temporary file, in `dir` or the system temp directory.
    TempFile { dir: Option<PathBuf> },
}

#[derive(Debug, Clone, Default)]
pub struct LopdfEncoderFactory {
    spool: SpoolMode,
}

impl LopdfEncoderFactory {
    pub fn new(spool: SpoolMode) -> Self {
        Self { spool }
    }
}

impl EncoderFactory for LopdfEncoderFactory {
    fn begin(&self) -> Result<Box<dyn DocumentEncoder>, EncodeError> {
        match &self.spool {
            SpoolMode::Memory => Ok(Box::new(LopdfEncoder::new(Cursor::new(Vec::new()))?)),
            SpoolMode::TempFile { dir } => {
                let file = match dir {
                    Some(dir) => tempfile::tempfile_in(dir)?,
                    None => tempfile::tempfile()?,
                };
                Ok(Box::new(LopdfEncoder::new(BufWriter::new(file))?))
            }
        }
    }

    fn encode_page(&self, bitmap: &Bitmap, quality: f32) -> Result<EncodedPage, EncodeError> {
        encode_jpeg(bitmap, quality)
    }

    fn name(&self) -> &'static str {
        "LopdfEncoderFactory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn page(factory: &LopdfEncoderFactory) -> EncodedPage {
        let bitmap = Bitmap::new(RgbImage::from_pixel(40, 56, image::Rgb([250, 250, 250])));
        factory.encode_page(&bitmap, 0.8).unwrap()
    }

    fn build(spool: SpoolMode, pages: usize) -> Vec<u8> {
        let factory = LopdfEncoderFactory::new(spool);
        let mut encoder = factory.begin().unwrap();
        let page = page(&factory);
        for _ in 0..pages {
            encoder.append_page(&page).unwrap();
            encoder.flush().unwrap();
        }
        assert_eq!(encoder.page_count(), pages);
        encoder.finish().unwrap().into_bytes().unwrap()
    }

    #[test]
    fn memory_spool_produces_loadable_pdf() {
        let bytes = build(SpoolMode::Memory, 3);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn tempfile_spool_produces_loadable_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = build(
            SpoolMode::TempFile {
                dir: Some(dir.path().to_path_buf()),
            },
            2,
        );
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn pages_embed_a_dct_image() {
        let bytes = build(SpoolMode::Memory, 1);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 40);
    }
}
