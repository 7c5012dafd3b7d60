//! The typed ticket template. A renderer fills one of these per ticket
//! number and the rasterizer paints it; nothing downstream inspects the
//! request's styling directly.

use crate::color::Color;
use crate::ids::AssetRef;
use crate::request::DisplayMode;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub color: Color,
    pub font: Option<String>,
    /// Nominal size in CSS pixels at scale 1.
    pub size_px: f32,
}

impl TextLine {
    pub fn new(text: impl Into<String>, color: Color, size_px: f32) -> Self {
        Self {
            text: text.into(),
            color,
            font: None,
            size_px,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketVisual {
    pub number: u32,
    /// `#0042` style label shown on both stubs.
    pub number_label: String,
    pub mode: DisplayMode,
    pub brand_text: String,
    pub title: TextLine,
    pub subtitle: TextLine,
    pub date: TextLine,
    pub voucher: TextLine,
    pub location: TextLine,
    pub background: Option<AssetRef>,
    pub qr: Option<AssetRef>,
}

impl TicketVisual {
    /// Compact tickets hide the central info region.
    pub fn shows_info(&self) -> bool {
        self.mode == DisplayMode::Full
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetRef> {
        self.background.iter().chain(self.qr.iter())
    }
}
