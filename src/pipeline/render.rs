//! Page layout: fit a decoded raster onto the fixed output canvas.
//!
//! ## Why a fixed canvas?
//!
//! Fixed-layout readers scale each page image independently, so pages of
//! different shapes jump in size while flipping. Rendering every page to the
//! device resolution with white letterbox bars keeps the scale constant and
//! lets the reader display images 1:1.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::debug;

/// Opaque white, the letterbox colour.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Where a source raster lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitLayout {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Compute the aspect-preserving fit of `source` into `target`, centred.
///
/// `ratio = min(tw / sw, th / sh)`; scaled edges are `floor(edge * ratio)`,
/// offsets are `(target - scaled) / 2` with integer division.
///
/// The ratio is kept as an exact fraction so the bound edge always lands on
/// the canvas edge; `800.0 / 777.0 * 777.0` in floating point can floor to 799.
pub fn fit_within(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> FitLayout {
    let (sw, sh) = (u64::from(source_width.max(1)), u64::from(source_height.max(1)));
    let (tw, th) = (u64::from(target_width), u64::from(target_height));

    // tw / sw <= th / sh  ⇔  tw * sh <= th * sw
    let (scaled_width, scaled_height) = if tw * sh <= th * sw {
        (tw, sh * tw / sw)
    } else {
        (sw * th / sh, th)
    };
    // A sliver (e.g. 1x5000) would floor to zero; keep at least one pixel.
    let scaled_width = (scaled_width as u32).clamp(1, target_width);
    let scaled_height = (scaled_height as u32).clamp(1, target_height);

    FitLayout {
        scaled_width,
        scaled_height,
        offset_x: (target_width - scaled_width) / 2,
        offset_y: (target_height - scaled_height) / 2,
    }
}

/// Draw `image` onto a white `target_width` × `target_height` canvas.
///
/// The source is resampled with Catmull-Rom and alpha-composited over the
/// background, so transparent regions of PNG/GIF/WEBP pages come out white.
pub fn render_canvas(image: &DynamicImage, target_width: u32, target_height: u32) -> RgbaImage {
    let layout = fit_within(image.width(), image.height(), target_width, target_height);
    debug!(
        "Fit {}x{} → {}x{} at ({}, {}) on {}x{}",
        image.width(),
        image.height(),
        layout.scaled_width,
        layout.scaled_height,
        layout.offset_x,
        layout.offset_y,
        target_width,
        target_height
    );

    let source = image.to_rgba8();
    let scaled = imageops::resize(
        &source,
        layout.scaled_width,
        layout.scaled_height,
        FilterType::CatmullRom,
    );

    let mut canvas = RgbaImage::from_pixel(target_width, target_height, BACKGROUND);
    imageops::overlay(
        &mut canvas,
        &scaled,
        i64::from(layout.offset_x),
        i64::from(layout.offset_y),
    );
    canvas
}
