//! Document knowledge subsystem for skydoc.
//!
//! Turns an uploaded document into a searchable in-memory knowledge base:
//! loading, positional chunking, embedding, atomic collection commits, and
//! top-k cosine retrieval.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod retrieve;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider, MockProvider};
pub use ingest::Ingestor;
pub use retrieve::Retriever;
pub use store::DocumentStore;
pub use types::{CommitResult, DocumentChunk, Page, RetrievedContext};
