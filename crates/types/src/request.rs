//! The generation request: numbering range, page layout choice and the
//! ticket styling read by the ticket renderer.

use crate::color::Color;
use crate::ids::AssetRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How many tickets share one A4 page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TicketsPerPage {
    One,
    Two,
    Four,
    #[default]
    Six,
    Eight,
}

impl TicketsPerPage {
    pub const ALL: [TicketsPerPage; 5] = [Self::One, Self::Two, Self::Four, Self::Six, Self::Eight];

    pub fn count(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Six => 6,
            Self::Eight => 8,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("tickets per page must be one of 1, 2, 4, 6 or 8 (got {0})")]
pub struct InvalidTicketsPerPage(pub u8);

impl TryFrom<u8> for TicketsPerPage {
    type Error = InvalidTicketsPerPage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            8 => Ok(Self::Eight),
            other => Err(InvalidTicketsPerPage(other)),
        }
    }
}

impl From<TicketsPerPage> for u8 {
    fn from(value: TicketsPerPage) -> Self {
        value.count() as u8
    }
}

impl fmt::Display for TicketsPerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Full tickets carry the central info region; compact tickets hide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Full,
    Compact,
}

/// Where the finished document goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// A single document handed to a print surface. Never split.
    Print,
    #[default]
    Download,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Print => "print",
            Self::Download => "download",
        })
    }
}

fn default_true() -> bool {
    true
}

/// A complete, immutable description of one generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub start_number: u32,
    /// Inclusive.
    pub end_number: u32,
    #[serde(default)]
    pub tickets_per_page: TicketsPerPage,
    #[serde(default, alias = "displayMode")]
    pub ticket_mode: DisplayMode,
    #[serde(default = "default_true")]
    pub split_pdf: bool,
    #[serde(flatten)]
    pub style: TicketStyle,
}

impl GenerationRequest {
    pub fn new(start_number: u32, end_number: u32) -> Self {
        Self {
            start_number,
            end_number,
            tickets_per_page: TicketsPerPage::default(),
            ticket_mode: DisplayMode::default(),
            split_pdf: true,
            style: TicketStyle::default(),
        }
    }

    /// `end - start + 1`; zero or negative when the range is inverted.
    pub fn total_tickets(&self) -> i64 {
        i64::from(self.end_number) - i64::from(self.start_number) + 1
    }

    pub fn with_tickets_per_page(mut self, per_page: TicketsPerPage) -> Self {
        self.tickets_per_page = per_page;
        self
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.ticket_mode = mode;
        self
    }

    pub fn with_split(mut self, split: bool) -> Self {
        self.split_pdf = split;
        self
    }

    pub fn with_style(mut self, style: TicketStyle) -> Self {
        self.style = style;
        self
    }

    /// Every distinct raster asset referenced by this request's tickets.
    pub fn asset_refs(&self) -> Vec<AssetRef> {
        let mut refs = Vec::with_capacity(2);
        if let Some(bg) = self.style.background() {
            refs.push(bg);
        }
        if let Some(qr) = self.style.qr() {
            if !refs.contains(&qr) {
                refs.push(qr);
            }
        }
        refs
    }
}

/// Styling and text content of every ticket in a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketStyle {
    pub day_of_week: String,
    pub date_text: String,
    pub year: Option<i32>,
    pub date_color: Color,
    pub event_title: String,
    pub event_subtitle: String,
    pub title_font: String,
    pub subtitle_font: String,
    pub title_color: Color,
    pub subtitle_color: Color,
    pub brand_text: String,
    pub voucher_type: String,
    pub voucher_quantity: String,
    pub voucher_font: String,
    pub voucher_color: Color,
    #[serde(rename = "location1")]
    pub location_1: String,
    #[serde(rename = "location2")]
    pub location_2: String,
    pub image_url: String,
    /// The link encoded in the QR image; informational only.
    pub qr_link: String,
    /// The already-generated QR image.
    pub qr_url: String,
    pub title_size: u32,
    pub subtitle_size: u32,
}

impl Default for TicketStyle {
    fn default() -> Self {
        Self {
            day_of_week: String::new(),
            date_text: String::new(),
            year: None,
            date_color: Color::BLACK,
            event_title: String::new(),
            event_subtitle: String::new(),
            title_font: "Poppins".into(),
            subtitle_font: "Poppins".into(),
            title_color: Color::BLACK,
            subtitle_color: Color::BLACK,
            brand_text: "TICKET".into(),
            voucher_type: String::new(),
            voucher_quantity: "1".into(),
            voucher_font: "Poppins".into(),
            voucher_color: Color::BLACK,
            location_1: String::new(),
            location_2: String::new(),
            image_url: String::new(),
            qr_link: String::new(),
            qr_url: String::new(),
            title_size: 48,
            subtitle_size: 24,
        }
    }
}

impl TicketStyle {
    pub fn background(&self) -> Option<AssetRef> {
        AssetRef::from_input(&self.image_url)
    }

    pub fn qr(&self) -> Option<AssetRef> {
        AssetRef::from_input(&self.qr_url)
    }
}
