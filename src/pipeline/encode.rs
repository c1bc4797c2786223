//! Page encoding: rendered canvas → JPEG bytes.
//!
//! Every page leaves the pipeline as baseline JPEG regardless of what the
//! archive held. Fixed-layout readers decode JPEG fastest, and a single media
//! type keeps the manifest uniform.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Media type of every encoded page.
pub const PAGE_MEDIA_TYPE: &str = "image/jpeg";

/// File extension of every encoded page.
pub const PAGE_EXTENSION: &str = "jpeg";

/// Encode a rendered canvas as JPEG at `quality` (0–100).
///
/// JPEG has no alpha channel; the canvas is already composited on white so
/// dropping alpha loses nothing. The encoder's scale starts at 1, so 0 is
/// treated as 1.
pub fn encode_page(canvas: RgbaImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&rgb)?;
    debug!("Encoded page → {} bytes JPEG (q={})", buf.len(), quality);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encode_small_canvas() {
        let canvas = RgbaImage::from_pixel(128, 128, Rgba([255, 0, 0, 255]));
        let data = encode_page(canvas, 80).expect("encode should succeed");
        assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF]);

        let back = image::load_from_memory(&data).expect("valid JPEG");
        assert_eq!((back.width(), back.height()), (128, 128));
    }

    #[test]
    fn quality_affects_size() {
        let mut canvas = RgbaImage::new(256, 256);
        for (x, y, px) in canvas.enumerate_pixels_mut() {
            *px = Rgba([(x ^ y) as u8, (x * 3) as u8, (y * 7) as u8, 255]);
        }
        let low = encode_page(canvas.clone(), 0).unwrap();
        let high = encode_page(canvas, 100).unwrap();
        assert!(low.len() < high.len(), "{} vs {}", low.len(), high.len());
    }
}
