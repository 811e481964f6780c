//! In-memory vector document store with named collections.
//!
//! The store is the only shared mutable resource in the pipeline. Searches
//! take a read lock and see committed collections only; a commit swaps an
//! entire collection under the write lock, so an in-flight search observes
//! either the old collection in full or the new one in full, never a mix.

use crate::types::DocumentChunk;
use skydoc_core::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

/// Named, atomically-replaceable sets of chunks with nearest-neighbor
/// search.
#[derive(Debug, Default)]
pub struct DocumentStore {
    /// Committed collections, keyed by name
    collections: RwLock<HashMap<String, Vec<DocumentChunk>>>,

    /// Collection names with an ingestion currently in progress
    in_flight: Mutex<HashSet<String>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any collection has been committed with at least one chunk.
    pub fn is_populated(&self) -> bool {
        self.collections
            .read()
            .expect("store lock poisoned")
            .values()
            .any(|chunks| !chunks.is_empty())
    }

    /// Claim a collection name for ingestion.
    ///
    /// Only one ingestion may be in progress per collection name; a second
    /// attempt fails fast with `AppError::Busy`. The claim is released when
    /// the returned guard drops.
    pub fn begin_ingest(self: &Arc<Self>, name: &str) -> AppResult<IngestGuard> {
        let mut in_flight = self.in_flight.lock().expect("store lock poisoned");

        if !in_flight.insert(name.to_string()) {
            return Err(AppError::Busy(format!(
                "An ingestion into collection '{}' is already in progress",
                name
            )));
        }

        Ok(IngestGuard {
            store: Arc::clone(self),
            name: name.to_string(),
        })
    }

    /// Commit chunks as a named collection, replacing any previous
    /// collection of the same name in one atomic swap.
    pub fn upsert_collection(&self, name: &str, chunks: Vec<DocumentChunk>) {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let replaced = collections.insert(name.to_string(), chunks);

        if replaced.is_some() {
            tracing::info!(collection = name, "Replaced existing collection");
        } else {
            tracing::info!(collection = name, "Committed new collection");
        }
    }

    /// Search all collections for the top-k chunks most similar to the
    /// query vector.
    ///
    /// Results are ordered by descending cosine similarity; ties keep the
    /// original insertion order (the sort is stable). Fails with
    /// `AppError::NotFound` when no collection has ever been committed.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(DocumentChunk, f32)>> {
        let collections = self.collections.read().expect("store lock poisoned");

        if collections.is_empty() {
            return Err(AppError::NotFound(
                "No document collection has been committed".to_string(),
            ));
        }

        let mut results: Vec<(DocumentChunk, f32)> = collections
            .values()
            .flat_map(|chunks| chunks.iter())
            .map(|chunk| {
                let score = cosine_similarity(query, &chunk.embedding);
                (chunk.clone(), score)
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        tracing::debug!(returned = results.len(), requested = k, "Vector search");

        Ok(results)
    }

    /// Collection and chunk counts, for logging and debug output.
    pub fn stats(&self) -> (usize, usize) {
        let collections = self.collections.read().expect("store lock poisoned");
        let chunk_count = collections.values().map(Vec::len).sum();
        (collections.len(), chunk_count)
    }
}

/// RAII claim on a collection name during ingestion.
#[derive(Debug)]
pub struct IngestGuard {
    store: Arc<DocumentStore>,
    name: String,
}

impl Drop for IngestGuard {
    fn drop(&mut self) {
        self.store
            .in_flight
            .lock()
            .expect("store lock poisoned")
            .remove(&self.name);
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
