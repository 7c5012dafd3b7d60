//! Single-line text set from glyph outlines.
//!
//! Layout is unshaped: one glyph per char, advanced by its horizontal
//! metric. Chars the face lacks advance half an em and draw nothing.

use crate::canvas::{Canvas, DeviceRect};
use crate::fonts::FontFace;
use ticketpress_types::Color;
use tiny_skia::{Path, PathBuilder};

/// Text below this size in device pixels is skipped.
const MIN_FONT_PX: f32 = 1.0;

struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    /// Font units grow upward, the pixmap grows downward.
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl ttf_parser::OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

struct Placement {
    glyph: Option<ttf_parser::GlyphId>,
    /// Pen position in font units from the line start.
    pen: f32,
}

struct LineLayout {
    glyphs: Vec<Placement>,
    advance: f32,
}

fn layout(face: &ttf_parser::Face<'_>, text: &str) -> LineLayout {
    let missing_advance = f32::from(face.units_per_em()) * 0.5;
    let mut pen = 0.0;
    let mut glyphs = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let glyph = face.glyph_index(ch);
        let advance = glyph
            .and_then(|id| face.glyph_hor_advance(id))
            .map(f32::from)
            .unwrap_or(missing_advance);
        glyphs.push(Placement { glyph, pen });
        pen += advance;
    }
    LineLayout {
        glyphs,
        advance: pen,
    }
}

/// Draws `text` centered in `area`, starting at `size` device pixels and
/// shrinking until the line fits. Returns the size used, or `None` when
/// nothing was drawn.
pub(crate) fn draw_line(
    canvas: &mut Canvas,
    font: &FontFace,
    text: &str,
    area: DeviceRect,
    size: f32,
    color: Color,
) -> Option<f32> {
    if text.is_empty() || area.is_empty() {
        return None;
    }
    let face = font.parse()?;
    let units = f32::from(face.units_per_em());
    let line = layout(&face, text);
    if line.advance <= 0.0 {
        return None;
    }

    let line_units = f32::from(face.ascender()) - f32::from(face.descender());
    let size = size
        .min(area.width * units / line.advance)
        .min(area.height * units / line_units);
    if size < MIN_FONT_PX {
        return None;
    }

    let scale = size / units;
    let left = area.x + (area.width - line.advance * scale) / 2.0;
    let top = area.y + (area.height - line_units * scale) / 2.0;
    let baseline = top + f32::from(face.ascender()) * scale;

    for placed in &line.glyphs {
        let Some(glyph) = placed.glyph else {
            continue;
        };
        let mut builder = GlyphPathBuilder::new(left + placed.pen * scale, baseline, scale);
        if face.outline_glyph(glyph, &mut builder).is_none() {
            continue;
        }
        if let Some(path) = builder.finish() {
            canvas.fill_path(&path, color);
        }
    }
    Some(size)
}

/// Draws one char per row, top to bottom, for the narrow brand strip.
pub(crate) fn draw_column(canvas: &mut Canvas, font: &FontFace, text: &str, area: DeviceRect, color: Color) {
    let count = text.chars().count();
    if count == 0 || area.is_empty() {
        return;
    }
    let pitch = area.height / count as f32;
    let size = (area.width * 0.7).min(pitch);
    for (i, ch) in text.chars().enumerate() {
        let slot = DeviceRect {
            y: area.y + i as f32 * pitch,
            height: pitch,
            ..area
        };
        let mut buf = [0u8; 4];
        draw_line(canvas, font, ch.encode_utf8(&mut buf), slot, size, color);
    }
}
