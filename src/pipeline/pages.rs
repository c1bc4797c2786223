//! Concurrent page production: decode + render every archive entry.
//!
//! ## Fan-out
//!
//! Decoding and resampling are CPU-bound, so each entry runs on the blocking
//! pool via `spawn_blocking`; `buffer_unordered(concurrency)` bounds how many
//! are in flight at once.
//!
//! ## Fan-in
//!
//! Results are written into a slot vector indexed by the entry's position in
//! the archive, so no lock is needed and completion order cannot leak into
//! the output. Once every slot is filled the pages are stably sorted by
//! display name (ties keep archive order).

use crate::config::ConversionConfig;
use crate::error::PageError;
use crate::output::Page;
use crate::pipeline::archive::{entry_stem, ArchiveEntry};
use crate::pipeline::decode::{decode_image, DecodeError};
use crate::pipeline::encode::{encode_page, PAGE_EXTENSION, PAGE_MEDIA_TYPE};
use crate::pipeline::render::render_canvas;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Pages and dropped entries of one archive.
#[derive(Debug, Default)]
pub struct RenderedPages {
    /// Successfully rendered pages in final order.
    pub pages: Vec<Page>,
    /// Dropped entries in archive order.
    pub failures: Vec<PageError>,
}

/// Display name of the page produced from `entry_name`.
pub fn page_name(entry_name: &str) -> String {
    format!("{}.{}", entry_stem(entry_name), PAGE_EXTENSION)
}

/// Decode, fit and encode a single entry. Runs on a blocking thread.
pub fn render_entry(
    entry: &ArchiveEntry,
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Page, PageError> {
    let (kind, image) = decode_image(&entry.data).map_err(|e| match e {
        DecodeError::Unsupported => PageError::UnsupportedFormat {
            entry: entry.name.clone(),
        },
        DecodeError::Malformed { .. } => PageError::MalformedImage {
            entry: entry.name.clone(),
            detail: e.to_string(),
        },
    })?;
    debug!(
        "Decoded '{}' as {:?} ({}x{})",
        entry.name,
        kind,
        image.width(),
        image.height()
    );

    let canvas = render_canvas(&image, width, height);
    let data = encode_page(canvas, quality).map_err(|e| PageError::Encode {
        entry: entry.name.clone(),
        detail: e.to_string(),
    })?;

    Ok(Page {
        name: page_name(&entry.name),
        data,
        media_type: PAGE_MEDIA_TYPE.to_string(),
    })
}

/// Render every entry with at most `config.concurrency` in flight.
///
/// Returns only after every entry has been attempted. `archive` names the
/// source in log lines.
pub async fn render_entries(
    entries: Vec<ArchiveEntry>,
    config: &ConversionConfig,
    archive: &str,
) -> RenderedPages {
    let total = entries.len();
    let (width, height, quality) = (config.width, config.height, config.quality);

    let mut slots: Vec<Option<Result<Page, PageError>>> = (0..total).map(|_| None).collect();

    let mut results = stream::iter(entries.into_iter().enumerate().map(|(slot, entry)| {
        let name = entry.name.clone();
        async move {
            let result =
                tokio::task::spawn_blocking(move || render_entry(&entry, width, height, quality))
                    .await
                    .unwrap_or_else(|e| {
                        Err(PageError::WorkerPanicked {
                            entry: name,
                            detail: e.to_string(),
                        })
                    });
            (slot, result)
        }
    }))
    .buffer_unordered(config.concurrency.max(1));

    while let Some((slot, result)) = results.next().await {
        if let Some(ref cb) = config.progress_callback {
            match &result {
                Ok(page) => cb.on_page_complete(slot, total, page.data.len()),
                Err(e) => cb.on_page_error(slot, total, &e.to_string()),
            }
        }
        slots[slot] = Some(result);
    }

    // Barrier passed: every slot is filled.
    let mut rendered = RenderedPages::default();
    for result in slots.into_iter().flatten() {
        match result {
            Ok(page) => rendered.pages.push(page),
            Err(e) => {
                warn!("{}: dropping {}", archive, e);
                rendered.failures.push(e);
            }
        }
    }
    sort_pages(&mut rendered.pages);
    rendered
}

/// Final reading order: plain byte-wise comparison of display names.
///
/// `10.jpeg` sorts before `2.jpeg`; archives with unpadded page numbers come
/// out in lexicographic order.
pub fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ConversionProgressCallback;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn png(shade: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 60, Rgb([shade, shade, shade])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn entry(name: &str, data: Vec<u8>) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            data,
        }
    }

    fn config(concurrency: usize) -> ConversionConfig {
        ConversionConfig::builder()
            .width(128)
            .height(160)
            .quality(60)
            .concurrency(concurrency)
            .build()
            .unwrap()
    }

    #[test]
    fn page_names_use_output_extension() {
        assert_eq!(page_name("ch01/007.png"), "007.jpeg");
        assert_eq!(page_name("cover.webp"), "cover.jpeg");
    }

    #[test]
    fn render_entry_normalises_to_canvas() {
        let page = render_entry(&entry("x/01.png", png(0)), 128, 160, 60).unwrap();
        assert_eq!(page.name, "01.jpeg");
        assert_eq!(page.media_type, "image/jpeg");
        let img = image::load_from_memory(&page.data).unwrap();
        assert_eq!((img.width(), img.height()), (128, 160));
    }

    #[test]
    fn render_entry_classifies_failures() {
        let err = render_entry(&entry("ComicInfo.xml", b"<xml/>".to_vec()), 128, 128, 50)
            .unwrap_err();
        assert_eq!(
            err,
            PageError::UnsupportedFormat {
                entry: "ComicInfo.xml".into()
            }
        );

        let mut broken = png(10);
        broken.truncate(30);
        let err = render_entry(&entry("bad.png", broken), 128, 128, 50).unwrap_err();
        assert!(matches!(err, PageError::MalformedImage { ref entry, .. } if entry == "bad.png"));
    }

    #[test]
    fn sort_is_lexicographic_and_stable() {
        let mk = |name: &str, tag: u8| Page {
            name: name.into(),
            data: vec![tag],
            media_type: PAGE_MEDIA_TYPE.into(),
        };
        let mut pages = vec![
            mk("2.jpeg", 0),
            mk("10.jpeg", 1),
            mk("a.jpeg", 2),
            mk("1.jpeg", 3),
            mk("a.jpeg", 4),
        ];
        sort_pages(&mut pages);
        let order: Vec<_> = pages.iter().map(|p| (p.name.as_str(), p.data[0])).collect();
        assert_eq!(
            order,
            vec![
                ("1.jpeg", 3),
                ("10.jpeg", 1),
                ("2.jpeg", 0),
                ("a.jpeg", 2),
                ("a.jpeg", 4)
            ]
        );
    }

    #[tokio::test]
    async fn invalid_entries_are_dropped_not_fatal() {
        let entries = vec![
            entry("c.png", png(30)),
            entry("notes.txt", b"hello".to_vec()),
            entry("a.png", png(10)),
            entry("b.png", b"\x89PNG\r\n\x1a\nbroken".to_vec()),
        ];
        let rendered = render_entries(entries, &config(4), "test.cbz").await;

        let names: Vec<_> = rendered.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpeg", "c.jpeg"]);
        assert_eq!(rendered.failures.len(), 2);
        assert_eq!(rendered.failures[0].entry(), "notes.txt");
        assert_eq!(rendered.failures[1].entry(), "b.png");
    }

    #[tokio::test]
    async fn order_does_not_depend_on_worker_count() {
        let make = || {
            (0..12)
                .rev()
                .map(|i| entry(&format!("p{:02}.png", i), png(i as u8 * 20)))
                .collect::<Vec<_>>()
        };
        let serial = render_entries(make(), &config(1), "serial.cbz").await;
        let parallel = render_entries(make(), &config(8), "parallel.cbz").await;

        assert_eq!(serial.pages.len(), 12);
        assert_eq!(serial.pages, parallel.pages);
        assert_eq!(serial.pages[0].name, "p00.jpeg");
        assert_eq!(serial.pages[11].name, "p11.jpeg");
    }

    #[derive(Default)]
    struct IndexRecorder {
        seen: std::sync::Mutex<Vec<(usize, usize, bool)>>,
    }

    impl ConversionProgressCallback for IndexRecorder {
        fn on_page_complete(&self, index: usize, total: usize, _bytes: usize) {
            self.seen.lock().unwrap().push((index, total, true));
        }

        fn on_page_error(&self, index: usize, total: usize, _error: &str) {
            self.seen.lock().unwrap().push((index, total, false));
        }
    }

    #[tokio::test]
    async fn callback_index_is_position_among_rendered_entries() {
        let recorder = Arc::new(IndexRecorder::default());
        let config = ConversionConfig::builder()
            .width(128)
            .height(128)
            .concurrency(3)
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        let entries = vec![
            entry("a.png", png(0)),
            entry("notes.txt", b"hello".to_vec()),
            entry("b.png", png(50)),
        ];
        render_entries(entries, &config, "indexed.cbz").await;

        let mut seen = recorder.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![(0, 3, true), (1, 3, false), (2, 3, true)]);
    }

    #[tokio::test]
    async fn empty_input_yields_nothing() {
        let rendered = render_entries(Vec::new(), &config(2), "empty.cbz").await;
        assert!(rendered.pages.is_empty());
        assert!(rendered.failures.is_empty());
    }
}
