//! Text chunking with fixed window size and overlap.
//!
//! Chunk boundaries are purely positional and do not respect sentence or
//! paragraph units. Windows are measured in characters, not bytes, so
//! multi-byte text gets the same window and overlap lengths as ASCII.

use crate::types::{ChunkCandidate, Page};

/// Split the concatenated page text into overlapping windows.
///
/// Each window is `chunk_size` characters long and consecutive windows
/// overlap by `overlap` characters (the window slides forward by
/// `chunk_size - overlap`). The final window may be shorter. Each candidate
/// records the page its start offset falls on.
pub fn chunk_pages(pages: &[Page], chunk_size: usize, overlap: usize) -> Vec<ChunkCandidate> {
    assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");

    // Concatenate pages, remembering the byte offset each one starts at.
    let mut full = String::new();
    let mut page_starts = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            full.push('\n');
        }
        page_starts.push((full.len(), page.number));
        full.push_str(&page.text);
    }

    if full.is_empty() {
        return vec![];
    }

    // Byte offset of every char boundary, including the end of the text.
    // Windows index into this table so lengths count characters.
    let mut boundaries: Vec<usize> = full.char_indices().map(|(offset, _)| offset).collect();
    boundaries.push(full.len());
    let char_count = boundaries.len() - 1;

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0u32;

    loop {
        let end = (start + chunk_size).min(char_count);

        chunks.push(ChunkCandidate {
            page: page_at(&page_starts, boundaries[start]),
            chunk_index,
            text: full[boundaries[start]..boundaries[end]].to_string(),
        });
        chunk_index += 1;

        if end >= char_count {
            break;
        }

        start += step;
    }

    tracing::debug!(
        chunks = chunks.len(),
        chunk_size,
        overlap,
        "Chunked document text"
    );

    chunks
}

/// Page number containing the given offset.
fn page_at(page_starts: &[(usize, u32)], offset: usize) -> u32 {
    page_starts
        .iter()
        .rev()
        .find(|(start, _)| *start <= offset)
        .map(|(_, number)| *number)
        .unwrap_or(1)
}
