//! Archive reading: open a CBZ container and pull out its entries.
//!
//! A CBZ is a plain zip file. Entry names and extensions are carried along
//! for naming and ordering only; what an entry contains is decided later by
//! sniffing its bytes. Reading is blocking I/O plus inflate, so the async
//! entry point moves it onto the blocking pool.

use crate::error::{CbzPubError, PageError};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Largest entry accepted, in decompressed bytes.
///
/// Header sizes are attacker-controlled; an entry claiming more than this is
/// dropped before any buffer is allocated, and reads stop at the limit.
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// Upper bound on the buffer reserved up front from a header size.
const PREALLOC_LIMIT: u64 = 16 * 1024 * 1024;

/// One non-directory entry of the source archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Full entry name as stored in the archive.
    pub name: String,
    /// Raw (decompressed) bytes.
    pub data: Vec<u8>,
}

/// Everything read out of one archive.
#[derive(Debug, Default)]
pub struct ArchiveContents {
    /// Readable entries in archive order.
    pub entries: Vec<ArchiveEntry>,
    /// Entries whose bytes could not be read (bad CRC, unsupported method).
    pub unreadable: Vec<PageError>,
    /// Directory markers skipped.
    pub directories: usize,
}

impl ArchiveContents {
    /// Non-directory entries, readable or not.
    pub fn total_entries(&self) -> usize {
        self.entries.len() + self.unreadable.len()
    }
}

/// Strip directories and the last extension from an entry name.
pub fn entry_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

/// Open the archive at `path` and read every non-directory entry.
pub async fn read_archive(path: &Path) -> Result<ArchiveContents, CbzPubError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_archive_blocking(&path))
        .await
        .map_err(|e| CbzPubError::Internal(format!("Archive task panicked: {}", e)))?
}

/// Blocking implementation of [`read_archive`].
pub fn read_archive_blocking(path: &Path) -> Result<ArchiveContents, CbzPubError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CbzPubError::ArchiveNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(CbzPubError::ArchiveOpen {
                path: path.to_path_buf(),
                detail: e.to_string(),
            });
        }
    };
    let contents = read_entries(std::io::BufReader::new(file), path)?;
    info!(
        "Archive '{}': {} entries, {} unreadable, {} directories",
        path.display(),
        contents.entries.len(),
        contents.unreadable.len(),
        contents.directories
    );
    Ok(contents)
}

/// Read an archive held in memory. `label` names it in errors and logs.
pub fn read_archive_from_bytes(
    bytes: &[u8],
    label: impl Into<PathBuf>,
) -> Result<ArchiveContents, CbzPubError> {
    read_entries(Cursor::new(bytes), &label.into())
}

fn read_entries<R: Read + Seek>(reader: R, path: &Path) -> Result<ArchiveContents, CbzPubError> {
    let mut archive = ZipArchive::new(reader).map_err(|e| CbzPubError::ArchiveOpen {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut contents = ArchiveContents::default();
    for index in 0..archive.len() {
        let mut file = match archive.by_index(index) {
            Ok(f) => f,
            Err(e) => {
                warn!("{}: cannot open entry #{}: {}", path.display(), index, e);
                contents.unreadable.push(PageError::EntryRead {
                    entry: format!("#{index}"),
                    detail: e.to_string(),
                });
                continue;
            }
        };

        if file.is_dir() {
            contents.directories += 1;
            continue;
        }

        let name = file.name().to_string();
        let declared = file.size();
        if declared > MAX_ENTRY_BYTES {
            warn!(
                "{}: entry '{}' declares {} bytes, limit is {}",
                path.display(),
                name,
                declared,
                MAX_ENTRY_BYTES
            );
            contents.unreadable.push(PageError::EntryRead {
                entry: name,
                detail: format!("declared size {declared} exceeds {MAX_ENTRY_BYTES} bytes"),
            });
            continue;
        }

        let mut data = Vec::with_capacity(declared.min(PREALLOC_LIMIT) as usize);
        let read = (&mut file)
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut data)
            .map_err(|e| e.to_string())
            .and_then(|n| {
                if n as u64 > MAX_ENTRY_BYTES {
                    Err(format!("decompressed size exceeds {MAX_ENTRY_BYTES} bytes"))
                } else {
                    Ok(())
                }
            });
        if let Err(detail) = read {
            warn!("{}: cannot read entry '{}': {}", path.display(), name, detail);
            contents.unreadable.push(PageError::EntryRead {
                entry: name,
                detail,
            });
            continue;
        }

        debug!("Read entry '{}' ({} bytes)", name, data.len());
        contents.entries.push(ArchiveEntry { name, data });
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(files: &[(&str, &[u8])], dirs: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for dir in dirs {
            writer
                .add_directory(*dir, SimpleFileOptions::default())
                .unwrap();
        }
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_entry_stem() {
        assert_eq!(entry_stem("007.png"), "007");
        assert_eq!(entry_stem("ch01/007.png"), "007");
        assert_eq!(entry_stem("vol.1/page.final.jpg"), "page.final");
        assert_eq!(entry_stem("noext"), "noext");
        assert_eq!(entry_stem(".hidden"), ".hidden");
        assert_eq!(entry_stem("win\\dir\\a.gif"), "a");
    }

    #[test]
    fn directories_are_skipped_and_order_is_kept() {
        let bytes = build_zip(&[("ch01/b.png", b"bbb"), ("ch01/a.png", b"aa")], &["ch01/"]);
        let contents = read_archive_from_bytes(&bytes, "mem.cbz").unwrap();

        assert_eq!(contents.directories, 1);
        assert_eq!(contents.entries.len(), 2);
        assert_eq!(contents.entries[0].name, "ch01/b.png");
        assert_eq!(contents.entries[0].data, b"bbb");
        assert_eq!(contents.entries[1].name, "ch01/a.png");
        assert_eq!(contents.total_entries(), 2);
    }

    /// Rewrite the uncompressed size of the only entry in both its local and
    /// central headers.
    fn forge_uncompressed_size(bytes: &mut [u8], size: u32) {
        let patch = |bytes: &mut [u8], signature: &[u8; 4], offset: usize| {
            let at = bytes
                .windows(4)
                .position(|w| w == signature)
                .expect("header present");
            bytes[at + offset..at + offset + 4].copy_from_slice(&size.to_le_bytes());
        };
        patch(bytes, b"PK\x03\x04", 22);
        patch(bytes, b"PK\x01\x02", 24);
    }

    #[test]
    fn oversized_declared_entry_is_dropped_without_allocating() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("huge.png", stored).unwrap();
        writer.write_all(b"tiny").unwrap();
        writer.start_file("ok.png", stored).unwrap();
        writer.write_all(b"fine").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();
        // Only the first entry's headers are patched: `position` finds the first match.
        forge_uncompressed_size(&mut bytes, 0xFFFF_FFF0);

        let contents = read_archive_from_bytes(&bytes, "forged.cbz").unwrap();
        assert_eq!(contents.unreadable.len(), 1);
        assert_eq!(contents.unreadable[0].entry(), "huge.png");
        assert_eq!(contents.entries.len(), 1);
        assert_eq!(contents.entries[0].name, "ok.png");
        assert_eq!(contents.total_entries(), 2);
    }

    #[test]
    fn garbage_is_an_open_error() {
        let err = read_archive_from_bytes(b"definitely not a zip", "junk.cbz").unwrap_err();
        assert!(
            matches!(err, CbzPubError::ArchiveOpen { ref path, .. } if path == Path::new("junk.cbz")),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_archive_blocking(Path::new("/definitely/not/here.cbz")).unwrap_err();
        assert!(matches!(err, CbzPubError::ArchiveNotFound { .. }));
    }

    #[tokio::test]
    async fn async_reader_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.cbz");
        std::fs::write(&path, build_zip(&[("1.jpg", b"x")], &[])).unwrap();

        let contents = read_archive(&path).await.unwrap();
        assert_eq!(contents.entries.len(), 1);
        assert_eq!(contents.entries[0].name, "1.jpg");
    }
}
