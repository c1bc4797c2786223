//! # cbzpub
//!
//! Convert CBZ comic archives into fixed-layout EPUB books for e-ink readers.
//!
//! ## Why this crate?
//!
//! A CBZ is just a zip of page images in whatever size, codec and colour
//! space the scanner produced. E-readers choke on oversized pages and render
//! them unevenly. This crate decodes every page, fits it onto a canvas of the
//! reader's exact size, re-encodes it as a small JPEG and packages the result
//! as an EPUB with one page per image.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CBZ
//!  │
//!  ├─ 1. Archive  read every file entry into memory (spawn_blocking)
//!  ├─ 2. Decode   sniff JPEG / PNG / GIF / WebP by magic bytes
//!  ├─ 3. Render   aspect-fit onto a white canvas (CPU-bound, concurrent)
//!  ├─ 4. Encode   JPEG at the configured quality
//!  ├─ 5. Order    stable sort by display name
//!  └─ 6. Package  EPUB container, or a flat directory of images
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cbzpub::{convert_to_path, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .width(1072)
//!         .height(1448)
//!         .build()?;
//!     let stats = convert_to_path("volume01.cbz", "convert/volume01.epub", &config).await?;
//!     eprintln!("{} pages, {} dropped", stats.rendered_pages, stats.failed_entries);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cbzpub` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cbzpub = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod identifier;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OutputMode};
pub use convert::{
    convert, convert_batch, convert_from_bytes, convert_sync, convert_to_path, output_path_for,
};
pub use discover::{discover_archives, ArchiveInput};
pub use error::{CbzPubError, PageError};
pub use identifier::generate_identifier;
pub use output::{
    ArchiveOutcome, BatchReport, ConversionOutput, ConversionStats, Page, SourceDocument,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
