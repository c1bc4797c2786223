//! Error types for the cbzpub library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CbzPubError`] — **Fatal for one archive**: the archive cannot be opened,
//!   nothing in it could be rendered, or the output could not be written.
//!   Returned as `Err(CbzPubError)` from the `convert*` functions. A batch
//!   records it and moves on to the next archive.
//!
//! * [`PageError`] — **Non-fatal**: a single archive entry was not a supported
//!   image, was corrupt, or failed to encode. The entry is dropped from the
//!   output and the error is kept in [`crate::output::ConversionOutput`] so
//!   callers can report what was skipped.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cbzpub library.
///
/// Entry-level failures use [`PageError`] and never propagate here.
#[derive(Debug, Error)]
pub enum CbzPubError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input archive was not found at the given path.
    #[error("Archive not found: '{path}'\nCheck the path exists and is readable.")]
    ArchiveNotFound { path: PathBuf },

    /// The zip container could not be opened (corrupt header, truncated file).
    #[error("Failed to open archive '{path}': {detail}")]
    ArchiveOpen { path: PathBuf, detail: String },

    /// A directory given as input could not be listed.
    #[error("Failed to scan '{path}': {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every entry of the archive was dropped; there is nothing to package.
    #[error("Archive '{path}' produced no pages ({failed} entries failed)")]
    NoPages { path: PathBuf, failed: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// An entry of the output document could not be created or written.
    #[error("Failed to package '{path}': {detail}")]
    Packaging { path: PathBuf, detail: String },

    /// Another archive of the same batch already writes to this output.
    #[error("Output '{path}' is already produced by '{claimed_by}'")]
    OutputConflict { path: PathBuf, claimed_by: PathBuf },

    /// The extraction directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file in the extraction directory could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single archive entry.
///
/// The entry is dropped from the rendered page list; the conversion of the
/// remaining entries continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The entry could not be read out of the archive.
    #[error("Entry '{entry}': read failed: {detail}")]
    EntryRead { entry: String, detail: String },

    /// Magic bytes did not match JPEG, PNG, GIF or WEBP.
    #[error("Entry '{entry}': unsupported image format")]
    UnsupportedFormat { entry: String },

    /// Magic bytes matched but the codec rejected the data.
    #[error("Entry '{entry}': malformed image: {detail}")]
    MalformedImage { entry: String, detail: String },

    /// The rendered canvas could not be encoded.
    #[error("Entry '{entry}': encoding failed: {detail}")]
    Encode { entry: String, detail: String },

    /// The worker processing this entry panicked.
    #[error("Entry '{entry}': worker panicked: {detail}")]
    WorkerPanicked { entry: String, detail: String },
}

impl PageError {
    /// Name of the archive entry this error belongs to.
    pub fn entry(&self) -> &str {
        match self {
            PageError::EntryRead { entry, .. }
            | PageError::UnsupportedFormat { entry }
            | PageError::MalformedImage { entry, .. }
            | PageError::Encode { entry, .. }
            | PageError::WorkerPanicked { entry, .. } => entry,
        }
    }
}
