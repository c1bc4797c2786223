//! Image decoding: sniff magic bytes, then hand the data to the right codec.
//!
//! Comic archives routinely ship files whose extension lies (`.jpg` holding a
//! PNG, WEBP renamed to `.png`), so the extension is never consulted. The
//! leading bytes are matched against the four supported signatures in a fixed
//! order and the result is a closed [`ImageKind`].

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// The image encodings a CBZ page may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
}

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_MAGIC: &[u8] = b"GIF8";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_FOURCC: &[u8] = b"WEBP";

impl ImageKind {
    /// Identify the encoding from the leading bytes.
    ///
    /// Checked in order JPEG, PNG, GIF, WEBP. Input shorter than a
    /// signature never matches it.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(JPEG_MAGIC) {
            Some(ImageKind::Jpeg)
        } else if data.starts_with(PNG_MAGIC) {
            Some(ImageKind::Png)
        } else if data.starts_with(GIF_MAGIC) {
            Some(ImageKind::Gif)
        } else if data.starts_with(RIFF_MAGIC) && data.get(8..12) == Some(WEBP_FOURCC) {
            Some(ImageKind::WebP)
        } else {
            None
        }
    }

    /// The codec that decodes this kind.
    pub fn format(self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Gif => ImageFormat::Gif,
            ImageKind::WebP => ImageFormat::WebP,
        }
    }
}

/// Why an entry could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported image format")]
    Unsupported,
    #[error("{kind:?} decode failed: {detail}")]
    Malformed { kind: ImageKind, detail: String },
}

/// Decode raw entry bytes into a raster.
pub fn decode_image(data: &[u8]) -> Result<(ImageKind, DynamicImage), DecodeError> {
    let kind = ImageKind::sniff(data).ok_or(DecodeError::Unsupported)?;
    let image = image::load_from_memory_with_format(data, kind.format()).map_err(|e| {
        DecodeError::Malformed {
            kind,
            detail: e.to_string(),
        }
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::Malformed {
            kind,
            detail: "image has no pixels".into(),
        });
    }
    Ok((kind, image))
}
