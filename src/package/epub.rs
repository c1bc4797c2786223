//! EPUB packaging: ordered pages → zip container.
//!
//! Entry order matters to readers that sniff the container type:
//!
//! 1. `mimetype`, stored uncompressed, so its payload sits at a fixed offset
//! 2. one XHTML document per page
//! 3. one image per page, byte-identical to the rendered page
//! 4. `content.opf`, `toc.ncx`, `META-INF/container.xml`
//!
//! The file is written to a temporary sibling and renamed into place, so a
//! failed run never leaves a truncated `.epub` behind.

use super::templates::{
    container_xml, content_opf, page_xhtml, toc_ncx, CONTAINER_PATH, CONTENT_DIR, CONTENT_PATH,
    TOC_PATH,
};
use super::{manifest_items, PackageMetadata};
use crate::error::CbzPubError;
use crate::output::Page;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the first entry.
pub const MIMETYPE_PATH: &str = "mimetype";
/// Payload of the first entry.
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Write a complete EPUB for `pages` into `writer`, returning the writer.
pub fn write_epub<W: Write + Seek>(
    writer: W,
    pages: &[Page],
    meta: &PackageMetadata,
) -> ZipResult<W> {
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(writer);

    zip.start_file(MIMETYPE_PATH, stored)?;
    zip.write_all(EPUB_MIMETYPE.as_bytes())?;

    let items = manifest_items(pages);

    for item in &items {
        zip.start_file(format!("{CONTENT_DIR}/{}", item.page_href()), deflated)?;
        zip.write_all(page_xhtml(item).as_bytes())?;
    }

    // JPEG does not deflate; store the bytes as they are.
    for (item, page) in items.iter().zip(pages) {
        zip.start_file(format!("{CONTENT_DIR}/{}", item.image_href()), stored)?;
        zip.write_all(&page.data)?;
    }

    for (path, body) in [
        (CONTENT_PATH, content_opf(meta, &items)),
        (TOC_PATH, toc_ncx(meta, &items)),
        (CONTAINER_PATH, container_xml()),
    ] {
        zip.start_file(path, deflated)?;
        zip.write_all(body.as_bytes())?;
    }

    debug!("Wrote {} pages + 4 metadata entries", items.len());
    zip.finish()
}

/// Package `pages` as an EPUB file at `path`.
pub fn package_epub(
    pages: &[Page],
    meta: &PackageMetadata,
    path: &Path,
) -> Result<PathBuf, CbzPubError> {
    let packaging = |detail: String| CbzPubError::Packaging {
        path: path.to_path_buf(),
        detail,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| CbzPubError::DirectoryCreate {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".cbzpub-")
        .suffix(".epub.tmp")
        .tempfile_in(parent)
        .map_err(|e| packaging(format!("cannot create temporary file: {e}")))?;

    let buffered = write_epub(BufWriter::new(tmp.as_file_mut()), pages, meta)
        .map_err(|e| packaging(e.to_string()))?;
    buffered
        .into_inner()
        .map_err(|e| packaging(e.error().to_string()))?
        .sync_all()
        .map_err(|e| packaging(e.to_string()))?;

    tmp.persist(path)
        .map_err(|e| packaging(format!("cannot move into place: {}", e.error)))?;

    info!("Packaged {} pages → {}", pages.len(), path.display());
    Ok(path.to_path_buf())
}
