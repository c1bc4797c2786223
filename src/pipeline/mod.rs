//! Pipeline stages for CBZ-to-EPUB conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! archive ──▶ decode ──▶ render ──▶ encode ──▶ pages
//!  (zip)      (sniff)    (fit)      (JPEG)    (fan-in + sort)
//! ```
//!
//! 1. [`archive`] — read every non-directory entry out of the zip container
//! 2. [`decode`]  — sniff magic bytes and decode with the matching codec
//! 3. [`render`]  — fit the raster onto the white fixed-size canvas
//! 4. [`encode`]  — JPEG-encode the canvas at the configured quality
//! 5. [`pages`]   — run 2–4 for every entry on a bounded worker pool and
//!    impose the final page order

pub mod archive;
pub mod decode;
pub mod encode;
pub mod pages;
pub mod render;
