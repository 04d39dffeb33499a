//! Hunt screenshots → item rows.
//!
//! Text recognition itself is done by an external engine behind
//! [`OcrEngine`]. Images are recognized one at a time; a failing image is
//! logged and skipped so the rest of the batch still counts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use loot_types::{ExtractedItem, Notice};

use crate::consolidate::consolidate;
use crate::table::parse_table;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no recognized text for {path}: {source}")]
    MissingText {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("OCR engine failed on {path}: {message}")]
    Engine { path: PathBuf, message: String },
}

/// Anything that can turn a screenshot into plain text.
pub trait OcrEngine {
    fn recognize(&self, image: &Path) -> Result<String, OcrError>;
}

/// Reads text an OCR run already stored next to the image, as `<image>.txt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SidecarText;

impl SidecarText {
    pub fn text_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    }
}

impl OcrEngine for SidecarText {
    fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let path = Self::text_path(image);
        fs::read_to_string(&path).map_err(|source| OcrError::MissingText { path, source })
    }
}

/// Image files under `root`, sorted by path. A file path is returned as-is.
pub fn find_images(root: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .collect();
    images.sort();
    images
}

// ── Batch scanning ───────────────────────────────────────────────────────

/// Result of reading a batch of hunt screenshots.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntScan {
    /// Consolidated rows across all images.
    pub items: Vec<ExtractedItem>,
    /// Rows read from the images of this scan.
    pub found: usize,
    /// Rows merged into an earlier row with the same name.
    pub folded: usize,
    /// Images the engine could not read.
    pub failed: usize,
}

impl HuntScan {
    /// What to tell the user about this scan, if anything.
    pub fn notice(&self) -> Option<Notice> {
        if self.found == 0 {
            Some(Notice::EmptyResult)
        } else if self.folded > 0 {
            Some(Notice::DuplicatesFolded(self.folded))
        } else {
            None
        }
    }
}

/// Recognize and parse every image in order, then merge duplicate rows.
///
/// `progress` is called with (1-based index, total) before each image.
pub fn scan_images<E, F>(engine: &E, images: &[PathBuf], mut progress: F) -> HuntScan
where
    E: OcrEngine + ?Sized,
    F: FnMut(usize, usize),
{
    let total = images.len();
    let mut rows = Vec::new();
    let mut failed = 0;

    for (i, image) in images.iter().enumerate() {
        progress(i + 1, total);
        match engine.recognize(image) {
            Ok(text) => {
                let found = parse_table(&text);
                debug!(image = %image.display(), rows = found.len(), "parsed hunt table");
                rows.extend(found);
            }
            Err(e) => {
                warn!("skipping image {}/{}: {e}", i + 1, total);
                failed += 1;
            }
        }
    }

    let merged = consolidate(&rows);
    info!(
        images = total,
        failed,
        rows = rows.len(),
        items = merged.items.len(),
        "hunt scan finished"
    );
    HuntScan {
        items: merged.items,
        found: rows.len(),
        folded: merged.folded,
        failed,
    }
}

/// Recognize one more image and merge its rows into `existing`.
///
/// Unlike a batch scan, a recognition failure is returned to the caller.
pub fn append_image<E>(
    engine: &E,
    image: &Path,
    existing: &[ExtractedItem],
) -> Result<HuntScan, OcrError>
where
    E: OcrEngine + ?Sized,
{
    let text = engine.recognize(image)?;
    let found = parse_table(&text);
    if found.is_empty() {
        return Ok(HuntScan {
            items: existing.to_vec(),
            found: 0,
            folded: 0,
            failed: 0,
        });
    }

    let mut rows = existing.to_vec();
    rows.extend(found);
    let merged = consolidate(&rows);
    Ok(HuntScan {
        items: merged.items,
        found: rows.len() - existing.len(),
        folded: merged.folded,
        failed: 0,
    })
}

/// Append images one by one onto `existing`. An image that fails or reads
/// no rows is logged and the next one is still merged.
pub fn append_images<E>(engine: &E, images: &[PathBuf], existing: Vec<ExtractedItem>) -> HuntScan
where
    E: OcrEngine + ?Sized,
{
    let total = images.len();
    let mut scan = HuntScan {
        items: existing,
        found: 0,
        folded: 0,
        failed: 0,
    };

    for (i, image) in images.iter().enumerate() {
        match append_image(engine, image, &scan.items) {
            Ok(step) => {
                if step.found == 0 {
                    warn!("no items found in image {}/{}", i + 1, total);
                }
                scan.found += step.found;
                scan.folded += step.folded;
                scan.items = step.items;
            }
            Err(e) => {
                warn!("skipping image {}/{}: {e}", i + 1, total);
                scan.failed += 1;
            }
        }
    }

    info!(
        images = total,
        failed = scan.failed,
        rows = scan.found,
        items = scan.items.len(),
        "hunt append finished"
    );
    scan
}
