//! Result types produced by a conversion.

use crate::error::{CbzPubError, PageError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One rendered page, ready to be packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Display name: the entry's base name with the output extension,
    /// e.g. `ch01/007.png` → `007.jpeg`. Final page order sorts on it.
    pub name: String,

    /// Encoded bytes of the rendered canvas.
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Media type of `data`, e.g. `image/jpeg`.
    pub media_type: String,
}

/// The ordered pages of one archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Logical name, taken from the input file stem.
    pub name: String,
    /// Pages in final reading order.
    pub pages: Vec<Page>,
}

/// Timing and count statistics for one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Non-directory entries found in the archive.
    pub total_entries: usize,
    /// Entries that became pages.
    pub rendered_pages: usize,
    /// Entries dropped (unreadable, unsupported, malformed, encode failure).
    pub failed_entries: usize,
    /// Directory markers skipped.
    pub skipped_directories: usize,
    /// Wall-clock time of the whole conversion.
    pub total_duration_ms: u64,
    /// Time spent in the decode/render stage.
    pub render_duration_ms: u64,
    /// Time spent writing the output. Zero for in-memory conversions.
    pub package_duration_ms: u64,
}

/// Everything one in-memory conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub document: SourceDocument,
    /// Entries dropped: unreadable ones first, then the rest in archive order.
    pub failures: Vec<PageError>,
    pub stats: ConversionStats,
}

/// Outcome of one archive in a batch.
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<ConversionStats, CbzPubError>,
}

/// Outcome of a whole batch; every queued archive has an entry.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub archives: Vec<ArchiveOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.archives.iter().filter(|a| a.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.archives.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bytes_are_not_serialised() {
        let page = Page {
            name: "001.jpeg".into(),
            data: vec![0xFF; 4096],
            media_type: "image/jpeg".into(),
        };
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("001.jpeg"));
        assert!(!json.contains("255"));
    }

    #[test]
    fn batch_counts() {
        let report = BatchReport {
            archives: vec![
                ArchiveOutcome {
                    input: "a.cbz".into(),
                    output: "convert/a.epub".into(),
                    result: Ok(ConversionStats::default()),
                },
                ArchiveOutcome {
                    input: "b.cbz".into(),
                    output: "convert/b.epub".into(),
                    result: Err(CbzPubError::ArchiveNotFound {
                        path: "b.cbz".into(),
                    }),
                },
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
