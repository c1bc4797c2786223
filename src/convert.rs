//! Conversion entry points.
//!
//! [`convert`] turns one archive into an ordered in-memory
//! [`SourceDocument`]; [`convert_to_path`] additionally writes it out as an
//! EPUB or an image directory; [`convert_batch`] runs many archives one after
//! another and never stops at a failed one.

use crate::config::{ConversionConfig, OutputMode};
use crate::discover::ArchiveInput;
use crate::error::CbzPubError;
use crate::identifier::generate_identifier;
use crate::output::{ArchiveOutcome, BatchReport, ConversionOutput, ConversionStats, SourceDocument};
use crate::package::{package_epub, write_directory, PackageMetadata};
use crate::pipeline::archive::{self, ArchiveContents};
use crate::pipeline::pages::render_entries;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a CBZ file into an ordered list of rendered pages.
///
/// # Returns
/// `Ok(ConversionOutput)` as long as at least one entry rendered; dropped
/// entries are listed in `output.failures`.
///
/// # Errors
/// - archive missing or not a zip container
/// - no entry could be rendered
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, CbzPubError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let contents = archive::read_archive(input).await?;
    render_contents(contents, input, config, total_start).await
}

/// Convert an archive held in memory.
///
/// `name` plays the role of the input path: it becomes the document title
/// (without extension) and labels log lines and errors.
///
/// # Example
/// ```rust,no_run
/// use cbzpub::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("volume01.cbz")?;
/// let output = convert_from_bytes(&bytes, "volume01.cbz", &ConversionConfig::default()).await?;
/// println!("{} pages", output.document.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    name: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, CbzPubError> {
    let total_start = Instant::now();
    let contents = archive::read_archive_from_bytes(bytes, name)?;
    render_contents(contents, Path::new(name), config, total_start).await
}

/// Convert a CBZ file and write the result to `output`.
///
/// In [`OutputMode::Epub`] `output` is the `.epub` file; in
/// [`OutputMode::Extract`] it is the directory receiving the page images.
pub async fn convert_to_path(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, CbzPubError> {
    let total_start = Instant::now();
    let converted = convert(input, config).await?;
    let output = output.as_ref().to_path_buf();

    let package_start = Instant::now();
    let ConversionOutput {
        document,
        mut stats,
        ..
    } = converted;
    let mode = config.mode;
    let metadata = PackageMetadata {
        title: document.name,
        date: config.date_string(),
        identifier: generate_identifier(),
    };
    debug!("Packaging with {:?}", metadata);

    // Writing is sequential blocking I/O; keep it off the async workers.
    let pages = document.pages;
    tokio::task::spawn_blocking(move || match mode {
        OutputMode::Epub => package_epub(&pages, &metadata, &output).map(|_| ()),
        OutputMode::Extract => write_directory(&pages, &output).map(|_| ()),
    })
    .await
    .map_err(|e| CbzPubError::Internal(format!("Packaging task panicked: {}", e)))??;

    stats.package_duration_ms = package_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(stats)
}

/// Convert every archive in `inputs`, writing results below `output_dir`.
///
/// Each archive gets its own pipeline run; a failure is logged and recorded
/// in the report, and the batch moves on. An archive whose output path was
/// already claimed by an earlier archive of the batch is not converted and
/// is reported as [`CbzPubError::OutputConflict`].
pub async fn convert_batch(
    inputs: &[ArchiveInput],
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> BatchReport {
    let output_dir = output_dir.as_ref();
    let mut report = BatchReport::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for input in inputs {
        let output = input.output_path(output_dir, config.mode);

        let result = match claimed.get(&output) {
            Some(first) => Err(CbzPubError::OutputConflict {
                path: output.clone(),
                claimed_by: first.clone(),
            }),
            None => {
                claimed.insert(output.clone(), input.path.clone());
                info!("Converting: {} → {}", input.path.display(), output.display());
                convert_to_path(&input.path, &output, config).await
            }
        };
        match &result {
            Ok(stats) => info!(
                "Converted '{}': {}/{} pages in {}ms",
                input.path.display(),
                stats.rendered_pages,
                stats.total_entries,
                stats.total_duration_ms
            ),
            Err(e) => warn!("Failed to convert '{}': {}", input.path.display(), e),
        }
        report.archives.push(ArchiveOutcome {
            input: input.path.clone(),
            output,
            result,
        });
    }

    info!(
        "Batch complete: {} converted, {} failed",
        report.succeeded(),
        report.failed()
    );
    report
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, CbzPubError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CbzPubError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Where the output for `input` goes directly inside `output_dir`.
///
/// `a/b/vol01.cbz` → `<output_dir>/vol01.epub` (EPUB) or `<output_dir>/vol01/` (extract).
/// Batches place scanned archives in their subdirectory first, see
/// [`ArchiveInput::output_path`].
pub fn output_path_for(input: &Path, output_dir: &Path, mode: OutputMode) -> PathBuf {
    let stem = document_name(input);
    match mode {
        OutputMode::Epub => output_dir.join(format!("{stem}.epub")),
        OutputMode::Extract => output_dir.join(stem),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Document title: the input file name without its extension.
fn document_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

async fn render_contents(
    contents: ArchiveContents,
    input: &Path,
    config: &ConversionConfig,
    total_start: Instant,
) -> Result<ConversionOutput, CbzPubError> {
    let total_entries = contents.total_entries();
    let directories = contents.directories;
    let label = input.display().to_string();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_entries);
    }

    let render_start = Instant::now();
    let rendered = render_entries(contents.entries, config, &label).await;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let mut failures = contents.unreadable;
    failures.extend(rendered.failures);
    let pages = rendered.pages;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_entries, pages.len());
    }

    if pages.is_empty() {
        return Err(CbzPubError::NoPages {
            path: input.to_path_buf(),
            failed: failures.len(),
        });
    }

    let stats = ConversionStats {
        total_entries,
        rendered_pages: pages.len(),
        failed_entries: failures.len(),
        skipped_directories: directories,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        package_duration_ms: 0,
    };

    info!(
        "Rendered {}/{} entries of '{}' in {}ms",
        stats.rendered_pages, total_entries, label, render_duration_ms
    );

    Ok(ConversionOutput {
        document: SourceDocument {
            name: document_name(input),
            pages,
        },
        failures,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_follow_mode() {
        let input = Path::new("library/series/vol01.cbz");
        assert_eq!(
            output_path_for(input, Path::new("convert"), OutputMode::Epub),
            PathBuf::from("convert/vol01.epub")
        );
        assert_eq!(
            output_path_for(input, Path::new("convert"), OutputMode::Extract),
            PathBuf::from("convert/vol01")
        );
    }

    #[test]
    fn document_name_strips_extension() {
        assert_eq!(document_name(Path::new("a/Vol. 2.cbz")), "Vol. 2");
        assert_eq!(document_name(Path::new("noext")), "noext");
        assert_eq!(document_name(Path::new("/")), "document");
    }

    #[tokio::test]
    async fn missing_archive_is_reported() {
        let err = convert("/definitely/not/here.cbz", &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CbzPubError::ArchiveNotFound { .. }));
    }
}
