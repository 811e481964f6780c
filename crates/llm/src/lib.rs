//! LLM integration crate for skydoc.
//!
//! Provides a provider-agnostic abstraction for single-turn language model
//! calls through a unified trait-based interface. The answer composer and
//! the weather location extractor both depend only on [`LlmClient`].
//!
//! # Providers
//! - **Ollama**: local LLM runtime (default)
//! - **OpenAI-compatible**: hosted chat-completions endpoints
//!
//! # Example
//! ```no_run
//! use skydoc_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new(Duration::from_secs(10))?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
