//! Configuration types for CBZ-to-EPUB conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One config is shared by every archive
//! of a batch; nothing in it is mutated during a conversion.

use crate::error::CbzPubError;
use crate::progress::ProgressCallback;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest accepted canvas edge in pixels.
pub const MIN_CANVAS_EDGE: u32 = 128;

/// Configuration for a CBZ conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use cbzpub::{ConversionConfig, OutputMode};
///
/// let config = ConversionConfig::builder()
///     .width(1072)
///     .height(1448)
///     .quality(80)
///     .mode(OutputMode::Epub)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Output canvas width in pixels. Minimum 128. Default: 600.
    pub width: u32,

    /// Output canvas height in pixels. Minimum 128. Default: 800.
    pub height: u32,

    /// JPEG quality of every rendered page, 0–100. Default: 25.
    ///
    /// E-ink readers show 16 grey levels, so low qualities cost little
    /// visually and keep volumes small.
    pub quality: u8,

    /// Number of entries decoded and rendered in parallel.
    /// Default: available hardware parallelism.
    pub concurrency: usize,

    /// Package as an EPUB or extract a flat directory of images. Default: EPUB.
    pub mode: OutputMode,

    /// Publication date written into the manifest. Default: today (local time).
    pub date: Option<NaiveDate>,

    /// Per-entry progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 800,
            quality: 25,
            concurrency: default_concurrency(),
            mode: OutputMode::default(),
            date: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("quality", &self.quality)
            .field("concurrency", &self.concurrency)
            .field("mode", &self.mode)
            .field("date", &self.date)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The publication date as `YYYY-MM-DD`, falling back to today.
    pub fn date_string(&self) -> String {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width.max(MIN_CANVAS_EDGE);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height.max(MIN_CANVAS_EDGE);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality.min(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.config.date = Some(date);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, CbzPubError> {
        let c = &self.config;
        if c.width < MIN_CANVAS_EDGE || c.height < MIN_CANVAS_EDGE {
            return Err(CbzPubError::InvalidConfig(format!(
                "Canvas must be at least {MIN_CANVAS_EDGE}x{MIN_CANVAS_EDGE}, got {}x{}",
                c.width, c.height
            )));
        }
        if c.quality > 100 {
            return Err(CbzPubError::InvalidConfig(format!(
                "Quality must be 0–100, got {}",
                c.quality
            )));
        }
        if c.concurrency == 0 {
            return Err(CbzPubError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What a conversion writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// A packaged EPUB document (default).
    #[default]
    Epub,
    /// A plain directory of sequentially numbered page images.
    Extract,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reader_profile() {
        let c = ConversionConfig::default();
        assert_eq!((c.width, c.height), (600, 800));
        assert_eq!(c.quality, 25);
        assert!(c.concurrency >= 1);
        assert_eq!(c.mode, OutputMode::Epub);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConversionConfig::builder()
            .width(10)
            .height(0)
            .quality(250)
            .concurrency(0)
            .build()
            .expect("clamped values are valid");
        assert_eq!(c.width, MIN_CANVAS_EDGE);
        assert_eq!(c.height, MIN_CANVAS_EDGE);
        assert_eq!(c.quality, 100);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn build_rejects_fields_set_directly() {
        let builder = ConversionConfigBuilder {
            config: ConversionConfig {
                width: 64,
                ..ConversionConfig::default()
            },
        };
        assert!(matches!(
            builder.build(),
            Err(CbzPubError::InvalidConfig(_))
        ));
    }

    #[test]
    fn fixed_date_is_formatted() {
        let c = ConversionConfig::builder()
            .date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
            .build()
            .unwrap();
        assert_eq!(c.date_string(), "2024-03-09");
    }

    #[test]
    fn today_is_iso_formatted() {
        let s = ConversionConfig::default().date_string();
        assert_eq!(s.len(), 10);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[7..8], "-");
    }
}
