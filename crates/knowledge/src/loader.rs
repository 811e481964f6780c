//! Document loading and text extraction.
//!
//! Ingestion requires only page-segmented extractable text, not a specific
//! file format. Any readable UTF-8 file qualifies; pages are delimited by
//! form feed characters, and a file without form feeds is a single page.

use crate::types::Page;
use skydoc_core::{AppError, AppResult};
use std::path::Path;

/// Page delimiter in extracted text.
const PAGE_BREAK: char = '\x0c';

/// Load the pages of extractable text from a source document.
///
/// Fails with `AppError::Load` when the source is absent, unreadable, not
/// valid UTF-8 (corrupt or encrypted input), or contains no extractable
/// text.
pub fn load_pages(path: &Path) -> AppResult<Vec<Page>> {
    let raw = std::fs::read(path)
        .map_err(|e| AppError::Load(format!("Failed to read {:?}: {}", path, e)))?;

    let text = String::from_utf8(raw).map_err(|_| {
        AppError::Load(format!(
            "{:?} is not readable text (corrupt, binary, or encrypted input)",
            path
        ))
    })?;

    let pages: Vec<Page> = text
        .split(PAGE_BREAK)
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .enumerate()
        .map(|(i, page)| Page {
            number: i as u32 + 1,
            text: page.to_string(),
        })
        .collect();

    if pages.is_empty() {
        return Err(AppError::Load(format!(
            "{:?} contains no extractable text",
            path
        )));
    }

    tracing::debug!(path = ?path, pages = pages.len(), "Loaded document");

    Ok(pages)
}
