use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use ticketpress_traits::{Bitmap, EncodeError, EncodedPage};

/// Compresses `bitmap` as baseline JPEG. `quality` is in `0.0..=1.0`.
pub fn encode_jpeg(bitmap: &Bitmap, quality: f32) -> Result<EncodedPage, EncodeError> {
    let (width, height) = (bitmap.width(), bitmap.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::Image(
            "cannot encode a released bitmap".to_string(),
        ));
    }
    let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut jpeg = Vec::with_capacity((width * height / 8) as usize);
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder.encode(bitmap.pixels.as_raw(), width, height, ExtendedColorType::Rgb8)?;
    Ok(EncodedPage {
        jpeg,
        width_px: width,
        height_px: height,
    })
}
