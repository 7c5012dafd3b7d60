use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, dictionary};
use std::io::{self, Seek, Write};
use ticketpress_types::Size;

/// Writes a PDF whose pages are single images, one object at a time.
///
/// Object 1 is the page tree and object 2 the catalog; both are reserved up
/// front and written by `finish` once every page id is known.
pub struct StreamingPdfWriter<W: Write + Seek> {
    writer: W,
    /// `(object number, byte offset)` of every object written so far.
    offsets: Vec<(u32, u64)>,
    max_id: u32,
    pub pages_id: ObjectId,
    pub catalog_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// Page size in points.
    media_box: Size,
}

impl<W: Write + Seek> StreamingPdfWriter<W> {
    pub fn new(mut writer: W, version: &str, media_box: Size) -> io::Result<Self> {
        writer.write_all(format!("%PDF-{}\n%âãÏÓ\n", version).as_bytes())?;
        Ok(Self {
            writer,
            offsets: Vec::new(),
            max_id: 2,
            pages_id: (1, 0),
            catalog_id: (2, 0),
            page_ids: Vec::new(),
            media_box,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    /// Allocates an id for `object` and writes it immediately.
    pub fn write_object(&mut self, object: &Object) -> io::Result<ObjectId> {
        let id = self.new_object_id();
        self.write_object_at(id, object)?;
        Ok(id)
    }

    fn write_object_at(&mut self, id: ObjectId, object: &Object) -> io::Result<()> {
        let offset = self.writer.stream_position()?;
        self.offsets.push((id.0, offset));
        write!(self.writer, "{} {} obj\n", id.0, id.1)?;
        internal_writer::write_object(&mut self.writer, object)?;
        writeln!(self.writer, "\nendobj")
    }

    /// Writes a stream object without copying `data` into an `Object`.
    fn write_raw_stream(&mut self, mut dict: Dictionary, data: &[u8]) -> io::Result<ObjectId> {
        let id = self.new_object_id();
        let offset = self.writer.stream_position()?;
        self.offsets.push((id.0, offset));
        dict.set("Length", data.len() as i64);
        write!(self.writer, "{} {} obj\n", id.0, id.1)?;
        internal_writer::write_dictionary(&mut self.writer, &dict)?;
        self.writer.write_all(b"\nstream\n")?;
        self.writer.write_all(data)?;
        self.writer.write_all(b"\nendstream\nendobj\n")?;
        Ok(id)
    }

    /// Appends a page that shows `jpeg` stretched over the whole media box.
    pub fn write_image_page(&mut self, jpeg: &[u8], width_px: u32, height_px: u32) -> io::Result<ObjectId> {
        let image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width_px as i64,
            "Height" => height_px as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        };
        let image_id = self.write_raw_stream(image_dict, jpeg)?;

        let (w, h) = (self.media_box.width, self.media_box.height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let content_id = self.write_raw_stream(dictionary! {}, &encoded)?;

        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), w.into(), h.into()]),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        };
        let page_id = self.write_object(&Object::Dictionary(page))?;
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn finish(mut self) -> io::Result<W> {
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.write_object_at(self.pages_id, &Object::Dictionary(pages_dict))?;

        let catalog = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        self.write_object_at(self.catalog_id, &Object::Dictionary(catalog))?;

        let info = dictionary! {
            "Producer" => Object::string_literal("ticketpress"),
        };
        let info_id = self.write_object(&Object::Dictionary(info))?;

        let xref_start = self.writer.stream_position()?;
        self.offsets.sort_by_key(|(id, _)| *id);
        internal_writer::write_xref(&mut self.writer, &self.offsets, self.max_id)?;

        let trailer = dictionary! {
            "Size" => (self.max_id + 1) as i64,
            "Root" => self.catalog_id,
            "Info" => info_id,
        };
        writeln!(self.writer, "trailer")?;
        internal_writer::write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{}", xref_start)?;
        write!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

mod internal_writer {
    use lopdf::{Dictionary, Object, StringFormat};
    use std::collections::BTreeMap;
    use std::io::{self, Write};

    pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
        #[allow(unreachable_patterns)]
        match object {
            Object::Null => writer.write_all(b"null"),
            Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(writer, "{}", i),
            Object::Real(r) => write!(writer, "{:.3}", r),
            Object::Name(n) => {
                writer.write_all(b"/")?;
                writer.write_all(n)
            }
            Object::String(s, StringFormat::Literal) => {
                writer.write_all(b"(")?;
                for &byte in s {
                    if matches!(byte, b'(' | b')' | b'\\') {
                        writer.write_all(b"\\")?;
                    }
                    writer.write_all(&[byte])?;
                }
                writer.write_all(b")")
            }
            Object::String(s, StringFormat::Hexadecimal) => {
                writer.write_all(b"<")?;
                for byte in s {
                    write!(writer, "{:02X}", byte)?;
                }
                writer.write_all(b">")
            }
            Object::Array(items) => {
                writer.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writer.write_all(b" ")?;
                    }
                    write_object(writer, item)?;
                }
                writer.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(writer, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(writer, &dict)?;
                writer.write_all(b"\nstream\n")?;
                writer.write_all(&stream.content)?;
                writer.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
            _ => writer.write_all(b"null"),
        }
    }

    pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
        writer.write_all(b"<<")?;
        let sorted: BTreeMap<_, _> = dict.iter().collect();
        for (key, value) in sorted {
            writer.write_all(b"/")?;
            writer.write_all(key)?;
            writer.write_all(b" ")?;
            write_object(writer, value)?;
            writer.write_all(b" ")?;
        }
        writer.write_all(b">>")
    }

    /// Single-section table covering objects `0..=max_id`. `offsets` must be
    /// sorted by object number.
    pub fn write_xref<W: Write>(writer: &mut W, offsets: &[(u32, u64)], max_id: u32) -> io::Result<()> {
        writeln!(writer, "xref")?;
        writeln!(writer, "0 {}", max_id + 1)?;
        writeln!(writer, "0000000000 65535 f ")?;
        let mut entries = offsets.iter().peekable();
        for id in 1..=max_id {
            match entries.peek() {
                Some((entry_id, offset)) if *entry_id == id => {
                    writeln!(writer, "{:010} 00000 n ", offset)?;
                    entries.next();
                }
                _ => writeln!(writer, "0000000000 65535 f ")?,
            }
        }
        Ok(())
    }
}
