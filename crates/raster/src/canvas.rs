use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use ticketpress_types::{Color, Rect};
use tiny_skia::{
    FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash, Transform,
};

/// A box in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DeviceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DeviceRect {
    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }

    fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// A tiny-skia pixmap addressed in page millimetres.
pub(crate) struct Canvas {
    pixmap: Pixmap,
    px_per_mm: f32,
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

/// Premultiplies straight RGBA into a pixmap.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (src, dst) in image
        .as_raw()
        .chunks_exact(4)
        .zip(pixmap.data_mut().chunks_exact_mut(4))
    {
        let a = src[3];
        dst[0] = premul_u8(src[0], a);
        dst[1] = premul_u8(src[1], a);
        dst[2] = premul_u8(src[2], a);
        dst[3] = a;
    }
    Some(pixmap)
}

fn premul_u8(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

impl Canvas {
    /// `None` when the size is zero or too large for a pixmap.
    pub fn new(width: u32, height: u32, px_per_mm: f32, background: Color) -> Option<Self> {
        let mut pixmap = Pixmap::new(width, height)?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            255,
        ));
        Some(Self { pixmap, px_per_mm })
    }

    pub fn px_per_mm(&self) -> f32 {
        self.px_per_mm
    }

    /// Flattens the pixmap onto RGB. The canvas starts opaque, so every
    /// pixel demultiplies to its own color.
    pub fn into_image(self) -> RgbImage {
        let mut image = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgb([color.red(), color.green(), color.blue()]);
        }
        image
    }

    pub fn to_device(&self, rect: Rect) -> DeviceRect {
        DeviceRect {
            x: rect.x * self.px_per_mm,
            y: rect.y * self.px_per_mm,
            width: rect.width * self.px_per_mm,
            height: rect.height * self.px_per_mm,
        }
    }

    /// Rounds to whole pixels and clips to the canvas, for image blits.
    fn to_pixel_box(&self, rect: Rect) -> (u32, u32, u32, u32) {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let clamp = |v: f32, max: u32| (v.round().max(0.0) as u32).min(max);
        let x0 = clamp(rect.x * self.px_per_mm, w);
        let y0 = clamp(rect.y * self.px_per_mm, h);
        let x1 = clamp(rect.right() * self.px_per_mm, w);
        let y1 = clamp(rect.bottom() * self.px_per_mm, h);
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        let area = self.to_device(rect);
        if let Some(rect) = area.to_skia() {
            self.pixmap
                .fill_rect(rect, &fill_paint(color), Transform::identity(), None);
        }
    }

    pub fn fill_path(&mut self, path: &Path, color: Color) {
        self.pixmap.fill_path(
            path,
            &fill_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// One-device-pixel outline drawn just inside `rect`.
    pub fn stroke(&mut self, rect: Rect, color: Color) {
        let area = self.to_device(rect);
        let inset = DeviceRect {
            x: area.x + 0.5,
            y: area.y + 0.5,
            width: area.width - 1.0,
            height: area.height - 1.0,
        };
        let Some(rect) = inset.to_skia() else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &fill_paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// Vertical dashed line at page x `x_mm`, used for the stub perforation.
    pub fn dashed_vline(&mut self, x_mm: f32, top_mm: f32, bottom_mm: f32, color: Color) {
        let x = x_mm * self.px_per_mm;
        let mut pb = PathBuilder::new();
        pb.move_to(x, top_mm * self.px_per_mm);
        pb.line_to(x, bottom_mm * self.px_per_mm);
        let Some(path) = pb.finish() else {
            return;
        };
        let dash = (1.5 * self.px_per_mm).max(2.0);
        let mut stroke = Stroke {
            width: (0.3 * self.px_per_mm).max(1.0),
            ..Stroke::default()
        };
        stroke.dash = StrokeDash::new(vec![dash, dash], 0.0);
        self.pixmap.stroke_path(
            &path,
            &fill_paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// Scales `image` to cover `rect`, cropping the overflow around the center.
    pub fn draw_cover(&mut self, rect: Rect, image: &RgbaImage) {
        let (x, y, width, height) = self.to_pixel_box(rect);
        if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let scale = f32::max(
            width as f32 / image.width() as f32,
            height as f32 / image.height() as f32,
        );
        let scaled_w = ((image.width() as f32 * scale).ceil() as u32).max(width);
        let scaled_h = ((image.height() as f32 * scale).ceil() as u32).max(height);
        let scaled = imageops::resize(image, scaled_w, scaled_h, FilterType::Triangle);
        let off_x = (scaled_w - width) / 2;
        let off_y = (scaled_h - height) / 2;
        let cropped = imageops::crop_imm(&scaled, off_x, off_y, width, height).to_image();
        self.blit(x, y, &cropped);
    }

    /// Scales `image` to fit inside `rect` keeping its aspect ratio, centered.
    pub fn draw_contain(&mut self, rect: Rect, image: &RgbaImage) {
        let (x, y, width, height) = self.to_pixel_box(rect);
        if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let scale = f32::min(
            width as f32 / image.width() as f32,
            height as f32 / image.height() as f32,
        );
        let w = ((image.width() as f32 * scale).round() as u32).clamp(1, width);
        let h = ((image.height() as f32 * scale).round() as u32).clamp(1, height);
        let scaled = imageops::resize(image, w, h, FilterType::Triangle);
        self.blit(x + (width - w) / 2, y + (height - h) / 2, &scaled);
    }

    /// Source-over composite of `source` with its top left at (`x`, `y`).
    fn blit(&mut self, x: u32, y: u32, source: &RgbaImage) {
        let Some(pixmap) = to_pixmap(source) else {
            return;
        };
        self.pixmap.draw_pixmap(
            x as i32,
            y as i32,
            pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}
