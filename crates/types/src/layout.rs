use crate::geometry::{A4_HEIGHT_MM, A4_WIDTH_MM, Rect, Size};
use crate::request::{DisplayMode, TicketsPerPage};
use serde::Serialize;

/// One page of the plan: the inclusive ticket slice it holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLayout {
    /// Zero-based page index across the whole session.
    pub index: u32,
    pub first: u32,
    pub last: u32,
    pub scale: f32,
}

impl PageLayout {
    pub fn ticket_count(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn numbers(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// One physical PDF produced by a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputFile {
    pub index: u32,
    /// One-based part number when the range was split.
    pub part: Option<u32>,
    pub first: u32,
    pub last: u32,
    pub pages: Vec<PageLayout>,
}

impl OutputFile {
    pub fn ticket_count(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn file_name(&self) -> String {
        match self.part {
            Some(part) => format!("tickets_{}-{}_parte{}.pdf", self.first, self.last, part),
            None => format!("tickets_{}-{}.pdf", self.first, self.last),
        }
    }
}

/// Scale applied to each ticket so that `per_page` of them fit on A4.
pub fn scale_factor(per_page: TicketsPerPage, mode: DisplayMode) -> f32 {
    match (mode, per_page) {
        (DisplayMode::Full, TicketsPerPage::One | TicketsPerPage::Two) => 1.0,
        (DisplayMode::Full, TicketsPerPage::Four) => 0.85,
        (DisplayMode::Full, TicketsPerPage::Six) => 0.68,
        (DisplayMode::Full, TicketsPerPage::Eight) => 0.56,
        (DisplayMode::Compact, TicketsPerPage::One | TicketsPerPage::Two | TicketsPerPage::Four) => {
            1.0
        }
        (DisplayMode::Compact, TicketsPerPage::Six) => 0.85,
        (DisplayMode::Compact, TicketsPerPage::Eight) => 0.72,
    }
}

/// Unscaled ticket size in millimetres.
pub fn ticket_size_mm(mode: DisplayMode) -> Size {
    match mode {
        DisplayMode::Full => Size::new(190.0, 64.0),
        DisplayMode::Compact => Size::new(120.0, 50.0),
    }
}

/// Padding, gap and slot heights of an A4 page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub padding_v: f32,
    pub padding_h: f32,
    pub gap: f32,
    pub slot_height: f32,
    /// Single and double layouts center their slots vertically.
    pub centered: bool,
}

impl PageGeometry {
    pub fn for_layout(per_page: TicketsPerPage) -> Self {
        let (padding_v, padding_h, gap, centered) = match per_page {
            TicketsPerPage::One => (5.0, 5.0, 0.0, true),
            TicketsPerPage::Two => (5.0, 5.0, 5.0, true),
            TicketsPerPage::Four => (3.0, 3.0, 2.0, false),
            TicketsPerPage::Six => (2.0, 3.0, 1.0, false),
            TicketsPerPage::Eight => (2.0, 3.0, 0.5, false),
        };
        let slots = per_page.count() as f32;
        let content = A4_HEIGHT_MM - 2.0 * padding_v - gap * (slots - 1.0);
        Self {
            padding_v,
            padding_h,
            gap,
            slot_height: content / slots,
            centered,
        }
    }

    /// Frames for the first `count` slots, top to bottom.
    pub fn slot_rects(&self, count: u32) -> Vec<Rect> {
        let width = A4_WIDTH_MM - 2.0 * self.padding_h;
        let used = count as f32 * self.slot_height + count.saturating_sub(1) as f32 * self.gap;
        let top = if self.centered {
            (A4_HEIGHT_MM - used) / 2.0
        } else {
            self.padding_v
        };
        (0..count)
            .map(|i| {
                let y = top + i as f32 * (self.slot_height + self.gap);
                Rect::new(self.padding_h, y, width, self.slot_height)
            })
            .collect()
    }
}
