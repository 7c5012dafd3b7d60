//! Image-page PDF encoder built on lopdf.
//!
//! Every page is one full-bleed JPEG. Objects are written to the output as
//! soon as a page is appended, so memory stays flat regardless of page count;
//! only the page tree and cross-reference table are emitted at the end.

mod encoder;
mod jpeg;
mod writer;

pub use encoder::{LopdfEncoder, LopdfEncoderFactory, SpoolMode, SpoolTarget};
pub use jpeg::encode_jpeg;
pub use writer::StreamingPdfWriter;
