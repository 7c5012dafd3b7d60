use crate::asset::SharedImage;
use crate::executor::OffloadError;
use async_trait::async_trait;
use image::RgbImage;
use std::collections::HashMap;
use thiserror::Error;
use ticketpress_types::geometry::{A4_HEIGHT_PX, A4_WIDTH_PX};
use ticketpress_types::{AssetRef, Color, Rect, TicketVisual};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("page capture failed: {0}")]
    Capture(String),

    #[error("capture size {width}x{height} is not valid")]
    InvalidSize { width: u32, height: u32 },

    #[error(transparent)]
    Offload(#[from] OffloadError),
}

/// One ticket placed on the page. `frame` is the ticket's own box in page
/// millimetres, already scaled and positioned inside its slot.
#[derive(Debug, Clone)]
pub struct PlacedTicket {
    pub visual: TicketVisual,
    pub frame: Rect,
    pub scale: f32,
}

/// The scratch page: tickets in slot order plus the assets that resolved in
/// time. Reused across pages; `clear` keeps the allocations.
#[derive(Debug, Clone, Default)]
pub struct PageComposition {
    pub page_index: u32,
    pub tickets: Vec<PlacedTicket>,
    pub assets: HashMap<AssetRef, SharedImage>,
}

impl PageComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        self.assets.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Distinct assets referenced by the placed tickets, in first-use order.
    pub fn asset_refs(&self) -> Vec<AssetRef> {
        let mut refs: Vec<AssetRef> = Vec::new();
        for asset in self.tickets.iter().flat_map(|t| t.visual.assets()) {
            if !refs.contains(asset) {
                refs.push(asset.clone());
            }
        }
        refs
    }

    pub fn asset(&self, asset: &AssetRef) -> Option<&SharedImage> {
        self.assets.get(asset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per CSS pixel.
    pub scale: f32,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    pub background: Color,
    pub width_px: u32,
    pub height_px: u32,
}

impl CaptureOptions {
    pub fn a4(scale: f32, quality: f32) -> Self {
        Self {
            scale,
            quality,
            background: Color::WHITE,
            width_px: A4_WIDTH_PX,
            height_px: A4_HEIGHT_PX,
        }
    }

    /// Output bitmap dimensions after applying `scale`.
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.width_px as f32 * self.scale).round() as u32,
            (self.height_px as f32 * self.scale).round() as u32,
        )
    }
}

/// A captured page.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub pixels: RgbImage,
}

impl Bitmap {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Frees the pixel buffer, leaving a zero-sized image behind.
    pub fn release(&mut self) {
        self.pixels = RgbImage::new(0, 0);
    }
}

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn capture(
        &self,
        page: &PageComposition,
        options: &CaptureOptions,
    ) -> Result<Bitmap, RasterError>;

    fn name(&self) -> &'static str;
}
