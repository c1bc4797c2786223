//! Progress-callback trait for per-entry conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline finishes each archive entry.
//!
//! # Example
//!
//! ```rust
//! use cbzpub::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, index: usize, total_entries: usize, bytes: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("entry {}/{} rendered ({} bytes), {} done", index + 1, total_entries, bytes, done);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each archive entry.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in completion order, which is not the
/// final page order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any entry is decoded.
    ///
    /// # Arguments
    /// * `total_entries` — non-directory entries that will be attempted
    fn on_conversion_start(&self, total_entries: usize) {
        let _ = total_entries;
    }

    /// Called when an entry has been decoded, rendered and encoded.
    ///
    /// # Arguments
    /// * `index`         — 0-based position among the readable file entries;
    ///   directory markers and unreadable records are not counted
    /// * `total_entries` — readable file entries being rendered
    /// * `bytes`         — size of the encoded page
    fn on_page_complete(&self, index: usize, total_entries: usize, bytes: usize) {
        let _ = (index, total_entries, bytes);
    }

    /// Called when an entry is dropped.
    ///
    /// # Arguments
    /// * `index`         — 0-based position among the readable file entries
    /// * `total_entries` — readable file entries being rendered
    /// * `error`         — human-readable error description
    fn on_page_error(&self, index: usize, total_entries: usize, error: &str) {
        let _ = (index, total_entries, error);
    }

    /// Called once after every entry has been attempted.
    ///
    /// # Arguments
    /// * `total_entries` — total entries attempted
    /// * `success_count` — entries that became pages
    fn on_conversion_complete(&self, total_entries: usize, success_count: usize) {
        let _ = (total_entries, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
