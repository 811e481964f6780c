//! Per-request trace records.
//!
//! Every request, successful or failed, emits exactly one trace event with
//! its classification, evidence size, and stage timings.

use crate::router::QueryKind;
use std::time::{Duration, Instant};

/// Accumulates timings across the pipeline stages of one request.
#[derive(Debug)]
pub struct RequestTrace {
    started: Instant,
    classification: Option<QueryKind>,
    evidence_size: usize,
    degraded: bool,
    route: Option<Duration>,
    resolve: Option<Duration>,
    compose: Option<Duration>,
}

impl RequestTrace {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            classification: None,
            evidence_size: 0,
            degraded: false,
            route: None,
            resolve: None,
            compose: None,
        }
    }

    pub fn routed(&mut self, classification: QueryKind, elapsed: Duration) {
        self.classification = Some(classification);
        self.route = Some(elapsed);
    }

    pub fn resolved(&mut self, evidence_size: usize, degraded: bool, elapsed: Duration) {
        self.evidence_size = evidence_size;
        self.degraded = degraded;
        self.resolve = Some(elapsed);
    }

    pub fn composed(&mut self, elapsed: Duration) {
        self.compose = Some(elapsed);
    }

    /// Emit the trace event. Consumes the trace; one event per request.
    pub fn emit(self, success: bool) {
        let total_ms = self.started.elapsed().as_millis() as u64;

        tracing::info!(
            target: "skydoc::trace",
            classification = self.classification.map(|c| c.as_str()).unwrap_or("none"),
            evidence_size = self.evidence_size,
            degraded = self.degraded,
            route_ms = self.route.map(|d| d.as_millis() as u64),
            resolve_ms = self.resolve.map(|d| d.as_millis() as u64),
            compose_ms = self.compose.map(|d| d.as_millis() as u64),
            total_ms,
            success,
            "Request finished"
        );
    }
}
