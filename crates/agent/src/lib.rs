//! Request orchestration for skydoc.
//!
//! Wires routing, evidence resolution, and answer composition into a single
//! pipeline: classify the query, gather weather or document evidence, then
//! compose a grounded answer. Resolver failures degrade to a fallback
//! answer instead of failing the request.

pub mod cancel;
pub mod compose;
pub mod router;
pub mod state;
pub mod trace;

#[cfg(test)]
mod tests;

pub use cancel::CancelToken;
pub use compose::Composer;
pub use router::{classify, QueryKind};
pub use state::{Evidence, PipelineState};

use serde::Serialize;
use skydoc_core::config::AppConfig;
use skydoc_core::{AppError, AppResult};
use skydoc_knowledge::{
    CommitResult, DocumentStore, EmbeddingProvider, Ingestor, Retriever,
};
use skydoc_llm::LlmClient;
use skydoc_weather::{OpenWeatherClient, WeatherResolver, WeatherService};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use trace::RequestTrace;

/// The default collection documents are ingested into.
pub const DEFAULT_COLLECTION: &str = "default";

/// The final answer plus debugging context for one request.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// The composed natural-language answer
    pub answer: String,

    /// How the query was classified
    pub classification: QueryKind,

    /// Whether the answer was produced from degraded (absent) evidence
    pub degraded: bool,

    /// Debug view of the evidence the answer was grounded on
    pub evidence: serde_json::Value,
}

/// The query-answering agent.
///
/// Shareable across concurrent requests; each request threads its own
/// [`PipelineState`] and never blocks on another request's stages.
pub struct Agent {
    store: Arc<DocumentStore>,
    ingestor: Ingestor,
    retriever: Retriever,
    resolver: WeatherResolver,
    composer: Composer,
}

impl Agent {
    /// Build an agent from explicit capability implementations.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        weather: Arc<dyn WeatherService>,
        model: impl Into<String>,
        chunk_size: usize,
        chunk_overlap: usize,
        top_k: usize,
    ) -> AppResult<Self> {
        let model = model.into();
        let store = Arc::new(DocumentStore::new());

        Ok(Self {
            ingestor: Ingestor::new(
                Arc::clone(&store),
                Arc::clone(&embedder),
                chunk_size,
                chunk_overlap,
            ),
            retriever: Retriever::new(Arc::clone(&store), embedder, top_k),
            resolver: WeatherResolver::new(Arc::clone(&llm), model.clone(), weather),
            composer: Composer::new(llm, model)?,
            store,
        })
    }

    /// Build an agent from application configuration, constructing the real
    /// LLM, embedding, and weather clients.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let llm_api_key = config.resolve_llm_api_key();
        let llm = skydoc_llm::create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            llm_api_key.as_deref(),
            timeout,
        )?;

        let embedder = skydoc_knowledge::create_provider(&config.embedding, timeout)?;

        let weather_api_key = config.resolve_weather_api_key()?;
        let weather: Arc<dyn WeatherService> = Arc::new(OpenWeatherClient::new(
            &config.weather.endpoint,
            weather_api_key,
            timeout,
        )?);

        Self::new(
            llm,
            embedder,
            weather,
            &config.llm.model,
            config.chunk_size,
            config.chunk_overlap,
            config.top_k,
        )
    }

    /// Ingest a document into the default collection.
    pub async fn ingest(&self, path: &Path) -> AppResult<CommitResult> {
        self.ingestor.ingest(path, DEFAULT_COLLECTION).await
    }

    /// Whether any document collection has been committed.
    pub fn has_documents(&self) -> bool {
        self.store.is_populated()
    }

    /// Answer a query, running the full pipeline to completion.
    pub async fn answer(&self, query: &str) -> AppResult<AgentResponse> {
        self.answer_with_cancel(query, &CancelToken::new()).await
    }

    /// Answer a query with cooperative cancellation between stages.
    ///
    /// Exactly one trace event is emitted per request, success or failure.
    pub async fn answer_with_cancel(
        &self,
        query: &str,
        cancel: &CancelToken,
    ) -> AppResult<AgentResponse> {
        let mut trace = RequestTrace::start();
        let result = self.run_pipeline(query, cancel, &mut trace).await;
        trace.emit(result.is_ok());
        result
    }

    async fn run_pipeline(
        &self,
        query: &str,
        cancel: &CancelToken,
        trace: &mut RequestTrace,
    ) -> AppResult<AgentResponse> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Route
        let stage_start = Instant::now();
        let classification = classify(query, self.store.is_populated());
        let state = PipelineState::new(query).routed(classification);
        trace.routed(classification, stage_start.elapsed());
        tracing::debug!(classification = %classification, "Routed query");

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Resolve evidence
        let stage_start = Instant::now();
        let evidence = self.resolve_evidence(classification, query).await?;
        trace.resolved(evidence.size(), evidence.is_degraded(), stage_start.elapsed());
        let state = state.resolved(evidence);

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Compose
        let stage_start = Instant::now();
        let evidence_ref = match state.evidence() {
            Some(evidence) => evidence,
            None => return Err(AppError::Generation("Pipeline lost its evidence".to_string())),
        };
        let answer = self
            .composer
            .compose(classification, evidence_ref, query)
            .await?;
        trace.composed(stage_start.elapsed());

        let degraded = evidence_ref.is_degraded();
        let evidence_debug = evidence_json(evidence_ref);
        let state = state.answered(answer);

        Ok(AgentResponse {
            answer: state.answer().unwrap_or_default().to_string(),
            classification,
            degraded,
            evidence: evidence_debug,
        })
    }

    /// Gather evidence for the classified query.
    ///
    /// A failed resolver never fails the request: the failure is logged and
    /// converted into degraded evidence carrying the failure note, so the
    /// composer can explain the degradation. Cancellation is the exception
    /// and propagates.
    async fn resolve_evidence(
        &self,
        classification: QueryKind,
        query: &str,
    ) -> AppResult<Evidence> {
        match classification {
            QueryKind::Weather => match self.resolver.resolve(query).await {
                Ok(reading) => Ok(Evidence::Weather(reading)),
                Err(AppError::Cancelled) => Err(AppError::Cancelled),
                Err(err) => {
                    tracing::warn!(error = %err, "Weather resolution failed, degrading");
                    Ok(Evidence::None {
                        note: Some(err.to_string()),
                    })
                }
            },
            QueryKind::Document => match self.retriever.retrieve(query).await {
                Ok(context) => Ok(Evidence::Documents(context)),
                Err(AppError::Cancelled) => Err(AppError::Cancelled),
                Err(err) => {
                    tracing::warn!(error = %err, "Retrieval failed, degrading");
                    Ok(Evidence::None {
                        note: Some(err.to_string()),
                    })
                }
            },
            QueryKind::Unknown => Ok(Evidence::None { note: None }),
        }
    }
}

/// Debug-friendly JSON view of the gathered evidence.
fn evidence_json(evidence: &Evidence) -> serde_json::Value {
    match evidence {
        Evidence::Weather(reading) => serde_json::json!({
            "kind": "weather",
            "reading": reading,
        }),
        Evidence::Documents(context) => serde_json::json!({
            "kind": "documents",
            "chunks": context
                .chunks
                .iter()
                .map(|(chunk, score)| {
                    serde_json::json!({
                        "source": chunk.source,
                        "page": chunk.page,
                        "chunk_index": chunk.chunk_index,
                        "score": score,
                    })
                })
                .collect::<Vec<_>>(),
        }),
        Evidence::None { note } => serde_json::json!({
            "kind": "none",
            "note": note,
        }),
    }
}
