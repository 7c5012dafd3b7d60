use crate::canvas::Canvas;
use crate::fonts::FontLibrary;
use crate::text;
use ticketpress_traits::{PageComposition, PlacedTicket};
use ticketpress_types::geometry::PX_PER_MM;
use ticketpress_types::{Color, Rect, TextLine, TicketVisual};

const PLACEHOLDER: Color = Color::rgb(0xee, 0xee, 0xee);
const PERFORATION: Color = Color::rgb(0xbb, 0xbb, 0xbb);
const LABEL_SIZE_PX: f32 = 14.0;

/// Horizontal split of a ticket as fractions of its width.
struct Bands {
    brand: (f32, f32),
    image: (f32, f32),
    info: Option<(f32, f32)>,
    perforation: f32,
    stub: (f32, f32),
}

impl Bands {
    fn for_visual(visual: &TicketVisual) -> Self {
        if visual.shows_info() {
            Bands {
                brand: (0.0, 0.06),
                image: (0.06, 0.30),
                info: Some((0.38, 0.36)),
                perforation: 0.75,
                stub: (0.76, 0.22),
            }
        } else {
            Bands {
                brand: (0.0, 0.06),
                image: (0.06, 0.62),
                info: None,
                perforation: 0.70,
                stub: (0.72, 0.26),
            }
        }
    }
}

/// Device pixels per CSS pixel at this canvas scale.
fn device_per_css(canvas: &Canvas) -> f32 {
    canvas.px_per_mm() / PX_PER_MM
}

fn draw_text(canvas: &mut Canvas, fonts: &FontLibrary, area: Rect, line: &TextLine, ticket_scale: f32) {
    if line.is_empty() {
        return;
    }
    let face = fonts.resolve(line.font.as_deref());
    let size = line.size_px * ticket_scale * device_per_css(canvas);
    let area = canvas.to_device(area);
    text::draw_line(canvas, &face, line.text.trim(), area, size, line.color);
}

pub(crate) fn paint_ticket(
    canvas: &mut Canvas,
    fonts: &FontLibrary,
    ticket: &PlacedTicket,
    page: &PageComposition,
) {
    let frame = ticket.frame;
    let visual = &ticket.visual;
    let bands = Bands::for_visual(visual);

    canvas.fill(frame, Color::WHITE);

    let brand = frame.fraction(bands.brand.0, 0.0, bands.brand.1, 1.0);
    canvas.fill(brand, visual.title.color);
    let brand_area = canvas.to_device(brand);
    text::draw_column(
        canvas,
        &fonts.resolve(visual.title.font.as_deref()),
        visual.brand_text.trim(),
        brand_area,
        Color::WHITE,
    );

    let image = frame.fraction(bands.image.0, 0.0, bands.image.1, 1.0);
    match visual.background.as_ref().and_then(|a| page.asset(a)) {
        Some(bg) => canvas.draw_cover(image, bg),
        None => canvas.fill(image, PLACEHOLDER),
    }

    if let Some((x, w)) = bands.info {
        let info = frame.fraction(x, 0.05, w, 0.9);
        draw_text(canvas, fonts, info.fraction(0.0, 0.0, 1.0, 0.16), &visual.date, ticket.scale);
        draw_text(canvas, fonts, info.fraction(0.0, 0.18, 1.0, 0.30), &visual.title, ticket.scale);
        draw_text(canvas, fonts, info.fraction(0.0, 0.50, 1.0, 0.16), &visual.subtitle, ticket.scale);
        draw_text(canvas, fonts, info.fraction(0.0, 0.68, 1.0, 0.14), &visual.voucher, ticket.scale);
        draw_text(canvas, fonts, info.fraction(0.0, 0.84, 1.0, 0.16), &visual.location, ticket.scale);
    }

    canvas.dashed_vline(
        frame.x + frame.width * bands.perforation,
        frame.y + frame.height * 0.04,
        frame.bottom() - frame.height * 0.04,
        PERFORATION,
    );

    let stub = frame.fraction(bands.stub.0, 0.05, bands.stub.1, 0.9);
    let label = TextLine::new(visual.number_label.clone(), visual.title.color, LABEL_SIZE_PX);
    draw_text(canvas, fonts, stub.fraction(0.0, 0.0, 1.0, 0.18), &label, ticket.scale);
    let qr_area = stub.fraction(0.1, 0.22, 0.8, 0.56);
    match visual.qr.as_ref().and_then(|a| page.asset(a)) {
        Some(qr) => canvas.draw_contain(qr_area, qr),
        None => canvas.fill(qr_area, PLACEHOLDER),
    }
    let stub_title = TextLine {
        size_px: LABEL_SIZE_PX,
        ..visual.title.clone()
    };
    draw_text(canvas, fonts, stub.fraction(0.0, 0.82, 1.0, 0.18), &stub_title, ticket.scale);

    canvas.stroke(frame, Color::BORDER);
}
