//! Input discovery: expand files and directories into the archives of a batch.
//!
//! Archives found under a directory remember where they sat relative to it,
//! and their output is written to the same relative location below the
//! output directory. `seriesA/vol01.cbz` and `seriesB/vol01.cbz` therefore
//! become `convert/seriesA/vol01.epub` and `convert/seriesB/vol01.epub`.

use crate::config::OutputMode;
use crate::convert::output_path_for;
use crate::error::CbzPubError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One archive queued for conversion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveInput {
    /// Path of the CBZ file.
    pub path: PathBuf,
    /// Directory of the archive relative to the scanned root. Empty for files
    /// named directly and for archives at the top of a scanned directory.
    pub subdir: PathBuf,
}

impl ArchiveInput {
    /// An archive named directly; its output lands at the top of the output directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subdir: PathBuf::new(),
        }
    }

    /// Where this archive's output goes inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path, mode: OutputMode) -> PathBuf {
        output_path_for(&self.path, &output_dir.join(&self.subdir), mode)
    }
}

impl From<PathBuf> for ArchiveInput {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Expand `args` into a sorted, de-duplicated archive list.
///
/// Files are taken as given. Directories contribute their `*.cbz` files
/// (case-insensitive), descending into subdirectories only with `recursive`;
/// the output directory itself is never scanned.
pub fn discover_archives(
    args: &[PathBuf],
    output_dir: &Path,
    recursive: bool,
) -> Result<Vec<ArchiveInput>, CbzPubError> {
    let skip = output_dir.canonicalize().ok();
    let mut found = Vec::new();

    for arg in args {
        if arg.is_dir() {
            scan_dir(arg, arg, skip.as_deref(), recursive, &mut found)?;
        } else {
            found.push(ArchiveInput::new(arg.clone()));
        }
    }

    found.sort();
    found.dedup_by(|a, b| a.path == b.path);
    debug!("Discovered {} archive(s)", found.len());
    Ok(found)
}

fn scan_dir(
    root: &Path,
    dir: &Path,
    skip: Option<&Path>,
    recursive: bool,
    found: &mut Vec<ArchiveInput>,
) -> Result<(), CbzPubError> {
    if skip.is_some() && dir.canonicalize().ok().as_deref() == skip {
        debug!("Skipping output directory {}", dir.display());
        return Ok(());
    }

    let scan_error = |source| CbzPubError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        if path.is_dir() {
            if recursive {
                scan_dir(root, &path, skip, recursive, found)?;
            }
        } else if is_cbz(&path) {
            let subdir = dir
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            found.push(ArchiveInput { path, subdir });
        }
    }
    Ok(())
}

/// `*.cbz`, any case.
pub fn is_cbz(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("cbz"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, files: &[&str]) {
        for f in files {
            let path = root.join(f);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, b"").unwrap();
        }
    }

    fn paths(inputs: &[ArchiveInput]) -> Vec<PathBuf> {
        inputs.iter().map(|i| i.path.clone()).collect()
    }

    #[test]
    fn cbz_extension_is_case_insensitive() {
        assert!(is_cbz(Path::new("a/Vol 1.CBZ")));
        assert!(is_cbz(Path::new("b.cbz")));
        assert!(!is_cbz(Path::new("c.zip")));
        assert!(!is_cbz(Path::new("cbz")));
    }

    #[test]
    fn scan_respects_recursion_and_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("convert")).unwrap();
        touch(root, &["a.cbz", "b.CBZ", "notes.txt", "nested/c.cbz", "convert/d.cbz"]);

        let flat = discover_archives(&[root.to_path_buf()], &root.join("convert"), false).unwrap();
        assert_eq!(paths(&flat), vec![root.join("a.cbz"), root.join("b.CBZ")]);

        let deep = discover_archives(&[root.to_path_buf()], &root.join("convert"), true).unwrap();
        assert_eq!(
            paths(&deep),
            vec![root.join("a.cbz"), root.join("b.CBZ"), root.join("nested/c.cbz")]
        );
        assert_eq!(deep[2].subdir, PathBuf::from("nested"));
    }

    #[test]
    fn same_named_archives_keep_their_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("library");
        touch(&root, &["seriesA/vol01.cbz", "seriesB/vol01.cbz"]);
        let out = dir.path().join("convert");

        let found = discover_archives(&[root.clone()], &out, true).unwrap();
        let outputs: Vec<_> = found
            .iter()
            .map(|i| i.output_path(&out, OutputMode::Epub))
            .collect();
        assert_eq!(
            outputs,
            vec![
                out.join("seriesA").join("vol01.epub"),
                out.join("seriesB").join("vol01.epub")
            ]
        );

        let extracted = found[1].output_path(&out, OutputMode::Extract);
        assert_eq!(extracted, out.join("seriesB").join("vol01"));
    }

    #[test]
    fn direct_files_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, &["x.cbz"]);

        let found = discover_archives(
            &[root.join("x.cbz"), root.to_path_buf()],
            &root.join("convert"),
            false,
        )
        .unwrap();
        assert_eq!(found, vec![ArchiveInput::new(root.join("x.cbz"))]);
    }

    #[test]
    fn unreadable_directory_is_a_scan_error() {
        let err = scan_dir(
            Path::new("/definitely/not/here"),
            Path::new("/definitely/not/here"),
            None,
            false,
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CbzPubError::Scan { .. }), "got: {err:?}");
    }
}
