//! Weather resolution: location extraction followed by one service call.

use crate::client::WeatherService;
use crate::location::extract_location;
use crate::types::WeatherReading;
use skydoc_core::AppResult;
use skydoc_llm::LlmClient;
use std::sync::Arc;

/// Resolves a weather query into a [`WeatherReading`].
pub struct WeatherResolver {
    llm: Arc<dyn LlmClient>,
    model: String,
    service: Arc<dyn WeatherService>,
}

impl WeatherResolver {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, service: Arc<dyn WeatherService>) -> Self {
        Self {
            llm,
            model: model.into(),
            service,
        }
    }

    /// Extract the location and fetch current conditions.
    ///
    /// Fails with `LocationNotFound` or `Upstream`; a single upstream
    /// failure is surfaced immediately with no retry.
    pub async fn resolve(&self, query: &str) -> AppResult<WeatherReading> {
        let location = extract_location(self.llm.as_ref(), &self.model, query).await?;
        let reading = self.service.current(&location).await?;

        tracing::info!(
            location = %reading.location,
            temperature = reading.temperature,
            condition = %reading.condition,
            "Resolved weather"
        );

        Ok(reading)
    }
}
