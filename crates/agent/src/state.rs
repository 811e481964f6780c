//! Per-request pipeline state.
//!
//! Each request threads one `PipelineState` through the stages. The record
//! is built additively — every stage consumes the state and returns it with
//! its own output attached; fields are never removed or overwritten. No two
//! concurrent requests share a state.

use crate::router::QueryKind;
use skydoc_knowledge::RetrievedContext;
use skydoc_weather::WeatherReading;

/// Evidence gathered for the answer composer.
#[derive(Debug, Clone)]
pub enum Evidence {
    /// A live weather reading
    Weather(WeatherReading),

    /// Retrieved document context
    Documents(RetrievedContext),

    /// No evidence. Carries a degradation note when a resolver failed so
    /// the composed answer can explain the degradation instead of
    /// hallucinating.
    None { note: Option<String> },
}

impl Evidence {
    /// Number of evidence items (chunks, or 1 for a weather reading).
    pub fn size(&self) -> usize {
        match self {
            Self::Weather(_) => 1,
            Self::Documents(context) => context.chunks.len(),
            Self::None { .. } => 0,
        }
    }

    /// Whether this evidence is a degraded stand-in for a failed resolver.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::None { note: Some(_) })
    }
}

/// Pipeline stage, advanced strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Routed,
    Resolved,
    Answered,
}

/// The per-request record threaded through the orchestrator.
#[derive(Debug)]
pub struct PipelineState {
    query: String,
    stage: Stage,
    classification: Option<QueryKind>,
    evidence: Option<Evidence>,
    answer: Option<String>,
}

impl PipelineState {
    /// Create the state for a fresh request.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            stage: Stage::Start,
            classification: None,
            evidence: None,
            answer: None,
        }
    }

    /// Attach the router's classification. Start → Routed.
    pub fn routed(mut self, classification: QueryKind) -> Self {
        debug_assert_eq!(self.stage, Stage::Start);
        self.stage = Stage::Routed;
        self.classification = Some(classification);
        self
    }

    /// Attach the resolver's evidence. Routed → Resolved.
    pub fn resolved(mut self, evidence: Evidence) -> Self {
        debug_assert_eq!(self.stage, Stage::Routed);
        self.stage = Stage::Resolved;
        self.evidence = Some(evidence);
        self
    }

    /// Attach the composed answer. Resolved → Answered.
    pub fn answered(mut self, answer: impl Into<String>) -> Self {
        debug_assert_eq!(self.stage, Stage::Resolved);
        self.stage = Stage::Answered;
        self.answer = Some(answer.into());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn classification(&self) -> Option<QueryKind> {
        self.classification
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }
}
