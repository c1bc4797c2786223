//! Extraction mode: write rendered pages into a plain directory.
//!
//! Useful for readers that take a folder of images, or to inspect the
//! renderer's output. Files are named by position (`page001.jpeg`, …) so
//! any file browser lists them in reading order.

use super::manifest_items;
use crate::error::CbzPubError;
use crate::output::Page;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write every page into `dir`, creating it if needed. Returns the written paths.
pub fn write_directory(pages: &[Page], dir: &Path) -> Result<Vec<PathBuf>, CbzPubError> {
    std::fs::create_dir_all(dir).map_err(|e| CbzPubError::DirectoryCreate {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(pages.len());
    for (item, page) in manifest_items(pages).iter().zip(pages) {
        let path = dir.join(item.image_file_name());
        std::fs::write(&path, &page.data).map_err(|e| CbzPubError::Write {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }

    info!("Extracted {} pages → {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<Page> {
        ["b.jpeg", "a.jpeg"]
            .iter()
            .enumerate()
            .map(|(i, n)| Page {
                name: n.to_string(),
                data: vec![i as u8; 8],
                media_type: "image/jpeg".into(),
            })
            .collect()
    }

    #[test]
    fn pages_are_numbered_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("vol1");
        let written = write_directory(&pages(), &out).unwrap();

        assert_eq!(
            written,
            vec![out.join("page001.jpeg"), out.join("page002.jpeg")]
        );
        assert_eq!(std::fs::read(out.join("page001.jpeg")).unwrap(), vec![0u8; 8]);
        assert_eq!(std::fs::read(out.join("page002.jpeg")).unwrap(), vec![1u8; 8]);
    }

    #[test]
    fn directory_blocked_by_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("vol1");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = write_directory(&pages(), &blocker).unwrap_err();
        assert!(matches!(err, CbzPubError::DirectoryCreate { .. }), "got: {err:?}");
    }
}
