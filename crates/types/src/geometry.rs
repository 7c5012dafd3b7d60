//! Page geometry in millimetres, plus the unit conversions used when the
//! page is captured to pixels and placed into the PDF in points.

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// CSS reference pixels per millimetre (96 DPI).
pub const PX_PER_MM: f32 = 96.0 / 25.4;
/// PDF user-space points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// A4 page size in CSS pixels at 96 DPI, the capture size before scaling.
pub const A4_WIDTH_PX: u32 = 794;
pub const A4_HEIGHT_PX: u32 = 1123;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns a rect of `size` centered inside this one.
    pub fn centered(&self, size: Size) -> Rect {
        Rect {
            x: self.x + (self.width - size.width) / 2.0,
            y: self.y + (self.height - size.height) / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    /// Returns a sub-rect using fractions of this rect's width and height.
    pub fn fraction(&self, fx: f32, fy: f32, fw: f32, fh: f32) -> Rect {
        Rect {
            x: self.x + self.width * fx,
            y: self.y + self.height * fy,
            width: self.width * fw,
            height: self.height * fh,
        }
    }

    pub fn scaled(&self, factor: f32) -> Rect {
        Rect {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    pub fn scaled(&self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    /// Converts a millimetre size to PDF points.
    pub fn to_points(&self) -> Size {
        self.scaled(PT_PER_MM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_keeps_requested_size() {
        let outer = Rect::new(0.0, 0.0, 100.0, 50.0);
        let inner = outer.centered(Size::new(60.0, 10.0));
        assert_eq!(inner, Rect::new(20.0, 20.0, 60.0, 10.0));
    }

    #[test]
    fn a4_pixel_constants_match_96_dpi() {
        assert_eq!((A4_WIDTH_MM * PX_PER_MM).round() as u32, A4_WIDTH_PX);
        assert_eq!((A4_HEIGHT_MM * PX_PER_MM).round() as u32, A4_HEIGHT_PX);
    }

    #[test]
    fn a4_in_points() {
        let pt = Size::a4().to_points();
        assert!((pt.width - 595.28).abs() < 0.01);
        assert!((pt.height - 841.89).abs() < 0.01);
    }
}
