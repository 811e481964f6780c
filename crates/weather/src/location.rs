//! LLM-backed location extraction.
//!
//! Extraction delegates to a language-model call constrained to return one
//! location string or a sentinel; there is no hardcoded gazetteer.

use skydoc_llm::{LlmClient, LlmRequest};
use skydoc_core::{AppError, AppResult};

/// Sentinel the model is instructed to return when no location is present.
const NO_LOCATION: &str = "NONE";

const EXTRACTION_PROMPT: &str = "Extract the city or location name from the query below. \
Reply with the location name only, nothing else. \
If the query contains no location, reply with exactly NONE.\n\
Query: ";

/// Extract a single location string from the query.
///
/// Fails with `LocationNotFound` when the model returns the sentinel (or
/// nothing usable) and `Upstream` when the extraction call itself fails.
pub async fn extract_location(
    llm: &dyn LlmClient,
    model: &str,
    query: &str,
) -> AppResult<String> {
    let request = LlmRequest::new(format!("{}{}", EXTRACTION_PROMPT, query), model)
        .with_temperature(0.0)
        .with_max_tokens(16);

    let response = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Upstream(format!("Location extraction failed: {}", e)))?;

    let location = response.content.trim().trim_matches('"').to_string();

    if location.is_empty() || location.eq_ignore_ascii_case(NO_LOCATION) {
        return Err(AppError::LocationNotFound(format!(
            "Query contains no extractable location: {}",
            query
        )));
    }

    tracing::debug!(location = %location, "Extracted location");

    Ok(location)
}
