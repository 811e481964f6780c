//! Retrieval engine: query embedding plus top-k similarity search.

use crate::embeddings::EmbeddingProvider;
use crate::store::DocumentStore;
use crate::types::RetrievedContext;
use skydoc_core::{AppError, AppResult};
use std::sync::Arc;

/// Embeds a query and searches the document store for grounding context.
pub struct Retriever {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<DocumentStore>, embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }

    /// Retrieve the top-k chunks most similar to the query.
    ///
    /// Fails with `NotFound` when no collection has ever been committed and
    /// `Embedding` when the provider cannot embed the query.
    pub async fn retrieve(&self, query: &str) -> AppResult<RetrievedContext> {
        if !self.store.is_populated() {
            return Err(AppError::NotFound(
                "No document collection has been committed".to_string(),
            ));
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, self.top_k)?;

        tracing::debug!(
            chunks = results.len(),
            top_score = results.first().map(|(_, s)| *s).unwrap_or(0.0),
            "Retrieved context"
        );

        Ok(RetrievedContext::from_results(results))
    }
}
