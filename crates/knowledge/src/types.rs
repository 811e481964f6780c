//! Knowledge subsystem type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk of an ingested document, the unit of retrieval.
///
/// Created during ingestion, immutable afterward, owned exclusively by the
/// [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Origin document id (file name of the ingested source)
    pub source: String,

    /// Page the chunk starts on (1-based)
    pub page: u32,

    /// Position of the chunk within the document
    pub chunk_index: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// Internal chunk candidate before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    pub page: u32,
    pub chunk_index: u32,
    pub text: String,
}

/// A page of extractable text from a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number (1-based)
    pub number: u32,

    /// Extracted text
    pub text: String,
}

/// Ordered retrieval result: scored chunks plus the concatenated context
/// string handed to the answer composer. Created per query, consumed once.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Retrieved chunks with similarity scores, descending
    pub chunks: Vec<(DocumentChunk, f32)>,

    /// Chunk texts in score-descending order, blank-line separated
    pub context: String,
}

impl RetrievedContext {
    /// Build a context from scored search results.
    pub fn from_results(chunks: Vec<(DocumentChunk, f32)>) -> Self {
        let context = chunks
            .iter()
            .map(|(chunk, _)| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self { chunks, context }
    }

    /// Highest similarity score, 0.0 when empty.
    pub fn max_score(&self) -> f32 {
        self.chunks.first().map(|(_, score)| *score).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Result of a committed ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResult {
    /// Collection the chunks were committed to
    pub collection: String,

    /// Origin document id
    pub source: String,

    /// Number of chunks committed
    pub chunk_count: u32,

    /// Total bytes of extracted text
    pub byte_count: u64,

    /// When the commit completed
    pub committed_at: DateTime<Utc>,

    /// Wall-clock ingestion duration in seconds
    pub duration_secs: f64,
}
