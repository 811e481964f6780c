//! Query routing.
//!
//! Classification is a pure function of the query text and store
//! population: a static lowercase keyword table, no dynamic dispatch, no
//! side effects.

use serde::{Deserialize, Serialize};

/// Terms that indicate a live-weather query.
const WEATHER_TERMS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "climate",
    "rain",
    "sunny",
    "cloudy",
    "snow",
    "humidity",
    "windy",
];

/// Query classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Weather,
    Document,
    Unknown,
}

impl QueryKind {
    /// Canonical lowercase name, used in trace events and debug output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Document => "document",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query.
///
/// A weather keyword match takes precedence over document availability.
/// Non-weather queries route to Document only when the store is populated —
/// never against an empty store — and to Unknown otherwise.
/// Empty or whitespace-only queries are Unknown.
pub fn classify(query: &str, store_populated: bool) -> QueryKind {
    let query = query.trim().to_lowercase();

    if query.is_empty() {
        return QueryKind::Unknown;
    }

    if WEATHER_TERMS.iter().any(|term| query.contains(term)) {
        return QueryKind::Weather;
    }

    if store_populated {
        QueryKind::Document
    } else {
        QueryKind::Unknown
    }
}
