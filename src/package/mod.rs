//! Output packaging: EPUB container or flat image directory.
//!
//! Both writers consume the ordered page list produced by
//! [`crate::pipeline::pages`] and name pages by their 1-based position
//! (`page001`, `page002`, …), never by the original entry names.

pub mod epub;
pub mod extract;
pub mod templates;

use crate::output::Page;
use crate::pipeline::encode::PAGE_EXTENSION;

pub use epub::{package_epub, write_epub};
pub use extract::write_directory;

/// Per-page projection used by the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// 1-based position in the final page order.
    pub id: usize,
    /// Base identifier shared by the page's markup and image, e.g. `page007`.
    pub base: String,
    /// Media type of the page image.
    pub media_type: String,
}

impl ManifestItem {
    /// Path of the page markup relative to the OPF, e.g. `pages/page007.xhtml`.
    pub fn page_href(&self) -> String {
        format!("pages/{}.xhtml", self.base)
    }

    /// File name of the page image, e.g. `page007.jpeg`.
    pub fn image_file_name(&self) -> String {
        format!("{}.{}", self.base, PAGE_EXTENSION)
    }

    /// Path of the page image relative to the OPF, e.g. `images/page007.jpeg`.
    pub fn image_href(&self) -> String {
        format!("images/{}", self.image_file_name())
    }
}

/// Document-level values written into the manifest and navigation map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub identifier: String,
}

/// Base identifier of the page at 1-based position `id`.
pub fn page_base(id: usize) -> String {
    format!("page{:03}", id)
}

/// Project ordered pages onto contiguous manifest items `1..=N`.
pub fn manifest_items(pages: &[Page]) -> Vec<ManifestItem> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| ManifestItem {
            id: i + 1,
            base: page_base(i + 1),
            media_type: page.media_type.clone(),
        })
        .collect()
}
