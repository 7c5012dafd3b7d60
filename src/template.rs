//! The default ticket renderer: maps a request's styling onto a
//! `TicketVisual` for every ticket number.

use ticketpress_traits::TicketRenderer;
use ticketpress_types::{GenerationRequest, TextLine, TicketStyle, TicketVisual};

const TITLE_FALLBACK_SIZE: f32 = 45.0;
const TITLE_MIN_SIZE: f32 = 24.0;
/// Titles longer than this shrink by `TITLE_SHRINK_PER_CHAR` per extra char.
const TITLE_SHRINK_AFTER: usize = 15;
const TITLE_SHRINK_PER_CHAR: f32 = 1.2;

const DATE_SIZE: f32 = 14.0;
const VOUCHER_SIZE: f32 = 14.0;
const LOCATION_SIZE: f32 = 12.0;

/// `#0042`. Numbers above 9999 keep all their digits.
pub fn number_label(number: u32) -> String {
    format!("#{:04}", number)
}

pub fn title_size(style: &TicketStyle) -> f32 {
    let base = if style.title_size == 0 {
        TITLE_FALLBACK_SIZE
    } else {
        style.title_size as f32
    };
    let len = style.event_title.chars().count();
    if len > TITLE_SHRINK_AFTER {
        let shrunk = base - (len - TITLE_SHRINK_AFTER) as f32 * TITLE_SHRINK_PER_CHAR;
        shrunk.max(TITLE_MIN_SIZE)
    } else {
        base
    }
}

fn date_text(style: &TicketStyle) -> String {
    let year = style.year.map(|y| y.to_string());
    [
        Some(style.day_of_week.trim()),
        Some(style.date_text.trim()),
        year.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

fn voucher_text(style: &TicketStyle) -> String {
    format!("VALE POR {} {}", style.voucher_quantity, style.voucher_type)
        .trim_end()
        .to_string()
}

fn location_text(style: &TicketStyle) -> String {
    let primary = style.location_1.trim();
    let secondary = style.location_2.trim();
    if secondary.is_empty() {
        primary.to_string()
    } else {
        format!("{} • {}", primary, secondary)
    }
}

/// A chosen family followed by a generic fallback, as a stylesheet would
/// name it.
fn font_stack(family: &str, generic: &str) -> String {
    let family = family.trim();
    if family.is_empty() {
        generic.to_string()
    } else {
        format!("\"{}\", {}", family, generic)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTicketRenderer;

impl TemplateTicketRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn visual(&self, number: u32, request: &GenerationRequest) -> TicketVisual {
        let style = &request.style;
        TicketVisual {
            number,
            number_label: number_label(number),
            mode: request.ticket_mode,
            brand_text: style.brand_text.clone(),
            title: TextLine::new(&style.event_title, style.title_color, title_size(style))
                .with_font(font_stack(&style.title_font, "sans-serif")),
            subtitle: TextLine::new(
                &style.event_subtitle,
                style.subtitle_color,
                style.subtitle_size as f32,
            )
            .with_font(font_stack(&style.subtitle_font, "cursive")),
            date: TextLine::new(date_text(style), style.date_color, DATE_SIZE),
            voucher: TextLine::new(voucher_text(style), style.voucher_color, VOUCHER_SIZE)
                .with_font(font_stack(&style.voucher_font, "sans-serif")),
            location: TextLine::new(location_text(style), style.title_color, LOCATION_SIZE),
            background: style.background(),
            qr: style.qr(),
        }
    }
}

impl TicketRenderer for TemplateTicketRenderer {
    fn render(&self, number: u32, request: &GenerationRequest) -> Option<TicketVisual> {
        Some(self.visual(number, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketpress_types::{AssetRef, Color, DisplayMode};

    fn request() -> GenerationRequest {
        let mut style = TicketStyle {
            day_of_week: "SÁBADO".into(),
            date_text: "12 DE JULIO".into(),
            year: Some(2026),
            date_color: Color::rgb(200, 30, 30),
            event_title: "Gran Rifa".into(),
            voucher_type: "CENA".into(),
            location_1: "Plaza Mayor".into(),
            image_url: "bg.png".into(),
            ..TicketStyle::default()
        };
        style.qr_url = "  ".into();
        GenerationRequest::new(1, 10).with_style(style)
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(number_label(7), "#0007");
        assert_eq!(number_label(12345), "#12345");
    }

    #[test]
    fn long_titles_shrink_to_a_floor() {
        let mut style = TicketStyle::default();
        style.event_title = "x".repeat(15);
        assert_eq!(title_size(&style), 48.0);
        style.event_title = "x".repeat(20);
        assert!((title_size(&style) - 42.0).abs() < 1e-4);
        style.event_title = "x".repeat(80);
        assert_eq!(title_size(&style), 24.0);
        style.title_size = 0;
        style.event_title = "short".into();
        assert_eq!(title_size(&style), 45.0);
    }

    #[test]
    fn visual_fills_every_line() {
        let visual = TemplateTicketRenderer.render(42, &request()).unwrap();
        assert_eq!(visual.number_label, "#0042");
        assert_eq!(visual.date.text, "SÁBADO 12 DE JULIO 2026");
        assert_eq!(visual.date.color, Color::rgb(200, 30, 30));
        assert_eq!(visual.voucher.text, "VALE POR 1 CENA");
        assert_eq!(visual.location.text, "Plaza Mayor");
        assert_eq!(visual.title.font.as_deref(), Some("\"Poppins\", sans-serif"));
        assert_eq!(visual.subtitle.font.as_deref(), Some("\"Poppins\", cursive"));
        assert_eq!(visual.background, Some(AssetRef::new("bg.png")));
        assert_eq!(visual.qr, None);
        assert!(visual.shows_info());
    }

    #[test]
    fn blank_font_keeps_the_generic_family() {
        assert_eq!(font_stack("  ", "sans-serif"), "sans-serif");
        assert_eq!(font_stack("Lobster", "cursive"), "\"Lobster\", cursive");
    }

    #[test]
    fn second_location_is_joined_with_a_bullet() {
        let mut req = request();
        req.style.location_2 = "Centro".into();
        req.style.year = None;
        let visual = TemplateTicketRenderer.visual(1, &req);
        assert_eq!(visual.location.text, "Plaza Mayor • Centro");
        assert_eq!(visual.date.text, "SÁBADO 12 DE JULIO");
    }

    #[test]
    fn compact_mode_hides_info() {
        let req = request().with_mode(DisplayMode::Compact);
        assert!(!TemplateTicketRenderer.visual(1, &req).shows_info());
    }
}
