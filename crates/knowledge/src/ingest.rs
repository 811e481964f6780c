//! Document ingestion pipeline.
//!
//! load → chunk → embed → commit, each step a monotonic transformation with
//! no backtracking. An embedding failure aborts the whole run before
//! anything reaches the store, so there is never a partial commit.

use crate::chunker::chunk_pages;
use crate::embeddings::EmbeddingProvider;
use crate::loader::load_pages;
use crate::store::DocumentStore;
use crate::types::{CommitResult, DocumentChunk};
use chrono::Utc;
use skydoc_core::AppResult;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Turns a source document into a committed collection of embedded chunks.
pub struct Ingestor {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Ingestor {
    pub fn new(
        store: Arc<DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Ingest a document into the named collection.
    ///
    /// A fresh ingestion replaces a collection of the same name rather than
    /// appending. Fails with `Load` on unusable input, `Embedding` on
    /// provider failure (nothing is committed), and `Busy` when another
    /// ingestion into the same collection is in progress.
    pub async fn ingest(&self, path: &Path, collection: &str) -> AppResult<CommitResult> {
        let start = Instant::now();

        // Claim the collection name for the duration of this run.
        let _guard = self.store.begin_ingest(collection)?;

        tracing::info!(path = ?path, collection, "Starting ingestion");

        let pages = load_pages(path)?;
        let byte_count: u64 = pages.iter().map(|p| p.text.len() as u64).sum();

        let candidates = chunk_pages(&pages, self.chunk_size, self.chunk_overlap);
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();

        // One failed embedding aborts the whole ingestion.
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let chunks: Vec<DocumentChunk> = candidates
            .into_iter()
            .zip(embeddings)
            .map(|(candidate, embedding)| DocumentChunk {
                id: uuid::Uuid::new_v4().to_string(),
                source: source.clone(),
                page: candidate.page,
                chunk_index: candidate.chunk_index,
                text: candidate.text,
                embedding,
            })
            .collect();

        let chunk_count = chunks.len() as u32;
        self.store.upsert_collection(collection, chunks);

        let duration = start.elapsed();
        tracing::info!(
            collection,
            chunks = chunk_count,
            bytes = byte_count,
            duration_secs = duration.as_secs_f64(),
            "Ingestion committed"
        );

        Ok(CommitResult {
            collection: collection.to_string(),
            source,
            chunk_count,
            byte_count,
            committed_at: Utc::now(),
            duration_secs: duration.as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockProvider;
    use skydoc_core::AppError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ingestor(store: Arc<DocumentStore>) -> Ingestor {
        Ingestor::new(store, Arc::new(MockProvider::new(64)), 1000, 200)
    }

    fn write_doc(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", text).unwrap();
        file
    }

    #[tokio::test]
    async fn test_ingest_commits_chunks() {
        let store = Arc::new(DocumentStore::new());
        let file = write_doc(&"the quick brown fox ".repeat(150)); // ~3000 chars

        let result = ingestor(Arc::clone(&store))
            .ingest(file.path(), "docs")
            .await
            .unwrap();

        assert_eq!(result.collection, "docs");
        assert_eq!(result.chunk_count, 4); // ceil((3000 - 200) / 800)
        assert!(store.is_populated());

        let (collections, chunks) = store.stats();
        assert_eq!(collections, 1);
        assert_eq!(chunks, 4);
    }

    #[tokio::test]
    async fn test_reingest_replaces_same_collection() {
        let store = Arc::new(DocumentStore::new());
        let ing = ingestor(Arc::clone(&store));

        let first = write_doc(&"alpha beta gamma ".repeat(200));
        ing.ingest(first.path(), "docs").await.unwrap();
        let (_, before) = store.stats();

        let second = write_doc("tiny replacement document");
        ing.ingest(second.path(), "docs").await.unwrap();
        let (collections, after) = store.stats();

        assert_eq!(collections, 1);
        assert_eq!(after, 1);
        assert_ne!(before, after);

        // Superseded chunks are gone from search results
        let embedder = MockProvider::new(64);
        let query = embedder.embed("alpha beta gamma").await.unwrap();
        let results = store.search(&query, 10).unwrap();
        assert!(results
            .iter()
            .all(|(c, _)| c.text.contains("tiny replacement")));
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error_and_no_commit() {
        let store = Arc::new(DocumentStore::new());

        let err = ingestor(Arc::clone(&store))
            .ingest(Path::new("/nonexistent/doc.txt"), "docs")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Load(_)));
        assert!(!store.is_populated());
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_without_commit() {
        #[derive(Debug)]
        struct FailingProvider;

        #[async_trait::async_trait]
        impl crate::embeddings::EmbeddingProvider for FailingProvider {
            fn provider_name(&self) -> &str {
                "failing"
            }
            fn model_name(&self) -> &str {
                "failing"
            }
            fn dimensions(&self) -> usize {
                64
            }
            async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
                Err(AppError::Embedding("provider offline".to_string()))
            }
        }

        let store = Arc::new(DocumentStore::new());
        let ing = Ingestor::new(Arc::clone(&store), Arc::new(FailingProvider), 1000, 200);
        let file = write_doc("some document text");

        let err = ing.ingest(file.path(), "docs").await.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(!store.is_populated());

        // The in-flight claim was released despite the failure
        assert!(store.begin_ingest("docs").is_ok());
    }

    #[tokio::test]
    async fn test_ingest_releases_claim_on_success() {
        let store = Arc::new(DocumentStore::new());
        let ing = ingestor(Arc::clone(&store));
        let file = write_doc("short document");

        ing.ingest(file.path(), "docs").await.unwrap();
        assert!(store.begin_ingest("docs").is_ok());
    }
}
