//! Software page rasterizer.
//!
//! Paints a `PageComposition` onto a tiny-skia pixmap: every placed ticket
//! gets its brand strip, background, info lines, stub and QR image. Text is
//! set from real glyph outlines of the faces a `FontLibrary` resolves.
//! Painting runs on the offload pool as one unit of work per page.

mod canvas;
mod fonts;
mod text;
mod ticket;

pub use fonts::{FontFace, FontLibrary};

use async_trait::async_trait;
use canvas::Canvas;
use log::debug;
use std::sync::Arc;
use ticketpress_executor::OffloadImpl;
use ticketpress_traits::{Bitmap, CaptureOptions, PageComposition, PageRasterizer, RasterError};
use ticketpress_types::geometry::PX_PER_MM;

/// Largest bitmap edge accepted, in device pixels.
const MAX_EDGE_PX: u32 = 16_384;

#[derive(Debug, Clone, Default)]
pub struct SoftwareRasterizer {
    offload: OffloadImpl,
    fonts: Arc<FontLibrary>,
}

impl SoftwareRasterizer {
    /// Sets text with the bundled faces only.
    pub fn new(offload: OffloadImpl) -> Self {
        Self::with_fonts(offload, Arc::new(FontLibrary::bundled()))
    }

    pub fn with_fonts(offload: OffloadImpl, fonts: Arc<FontLibrary>) -> Self {
        Self { offload, fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }
}

/// Paints `page` synchronously. Exposed for benchmarks and callers that
/// already run on a worker thread.
pub fn paint_page(
    page: &PageComposition,
    options: &CaptureOptions,
    fonts: &FontLibrary,
) -> Result<Bitmap, RasterError> {
    let (width, height) = options.device_size();
    if width == 0 || height == 0 || width > MAX_EDGE_PX || height > MAX_EDGE_PX {
        return Err(RasterError::InvalidSize { width, height });
    }

    let mut canvas = Canvas::new(width, height, PX_PER_MM * options.scale, options.background)
        .ok_or(RasterError::InvalidSize { width, height })?;
    for placed in &page.tickets {
        ticket::paint_ticket(&mut canvas, fonts, placed, page);
    }
    Ok(Bitmap::new(canvas.into_image()))
}

#[async_trait]
impl PageRasterizer for SoftwareRasterizer {
    async fn capture(
        &self,
        page: &PageComposition,
        options: &CaptureOptions,
    ) -> Result<Bitmap, RasterError> {
        debug!(
            "Painting page {} ({} tickets) at scale {}",
            page.page_index + 1,
            page.tickets.len(),
            options.scale
        );
        // Tickets are small and assets are shared, so the copy is cheap.
        let snapshot = page.clone();
        let options = *options;
        let fonts = Arc::clone(&self.fonts);
        self.offload
            .run(move || paint_page(&snapshot, &options, &fonts))
            .await?
    }

    fn name(&self) -> &'static str {
        "SoftwareRasterizer"
    }
}
