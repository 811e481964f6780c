//! Configuration management for skydoc.
//!
//! Configuration is merged from three sources, lowest precedence first:
//! - Built-in defaults
//! - An optional YAML config file (`skydoc.yaml` or `SKYDOC_CONFIG`)
//! - Environment variables, then CLI flags

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Language model settings
    pub llm: LlmSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Weather service settings
    pub weather: WeatherSettings,

    /// Chunk window length in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per document query
    pub top_k: usize,

    /// Timeout applied to every outbound call (embeddings, weather, LLM)
    pub request_timeout_secs: u64,

    /// Log level override
    #[serde(default)]
    pub log_level: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

/// Language model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider identifier ("ollama", "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint URL (provider default when absent)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key, for providers that need one
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider identifier ("ollama", "mock")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint URL (provider default when absent)
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Weather service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// Weather API endpoint
    pub endpoint: String,

    /// Environment variable holding the weather API key
    pub api_key_env: String,
}

fn default_llm_key_env() -> String {
    "SKYDOC_API_KEY".to_string()
}

/// Partial structure of the YAML config file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    weather: Option<WeatherSettings>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    request_timeout_secs: Option<u64>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            llm: LlmSettings {
                provider: "ollama".to_string(), // Local-first default
                model: "llama3.2".to_string(),
                endpoint: None,
                api_key_env: default_llm_key_env(),
            },
            embedding: EmbeddingSettings {
                provider: "ollama".to_string(),
                model: "nomic-embed-text".to_string(),
                dimensions: 768,
                endpoint: None,
            },
            weather: WeatherSettings {
                endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
                api_key_env: "OPENWEATHER_API_KEY".to_string(),
            },
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            request_timeout_secs: 10,
            log_level: None,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `SKYDOC_CONFIG`: path to the YAML config file
    /// - `SKYDOC_PROVIDER` / `SKYDOC_MODEL`: LLM provider and model
    /// - `SKYDOC_LLM_ENDPOINT`: LLM endpoint override
    /// - `SKYDOC_EMBEDDING_PROVIDER` / `SKYDOC_EMBEDDING_MODEL`
    /// - `SKYDOC_TIMEOUT_SECS`: outbound request timeout
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("SKYDOC_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("skydoc.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the YAML config
        if let Ok(provider) = std::env::var("SKYDOC_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("SKYDOC_MODEL") {
            config.llm.model = model;
        }
        if let Ok(endpoint) = std::env::var("SKYDOC_LLM_ENDPOINT") {
            config.llm.endpoint = Some(endpoint);
        }
        if let Ok(provider) = std::env::var("SKYDOC_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(model) = std::env::var("SKYDOC_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(timeout) = std::env::var("SKYDOC_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid SKYDOC_TIMEOUT_SECS: {}", timeout)))?;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file over this config, returning the
    /// merged result.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(weather) = config_file.weather {
            result.weather = weather;
        }
        if let Some(chunk_size) = config_file.chunk_size {
            result.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = config_file.chunk_overlap {
            result.chunk_overlap = chunk_overlap;
        }
        if let Some(top_k) = config_file.top_k {
            result.top_k = top_k;
        }
        if let Some(timeout) = config_file.request_timeout_secs {
            result.request_timeout_secs = timeout;
        }
        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config
    /// file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the LLM API key from the configured environment variable.
    ///
    /// Returns `Ok(None)` when the variable is unset; providers that require
    /// a key reject that at client construction.
    pub fn resolve_llm_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env).ok()
    }

    /// Resolve the weather API key from the configured environment variable.
    pub fn resolve_weather_api_key(&self) -> AppResult<String> {
        std::env::var(&self.weather.api_key_env).map_err(|_| {
            AppError::Config(format!(
                "Weather API key not set (expected in ${})",
                self.weather.api_key_env
            ))
        })
    }

    /// Validate invariants that would otherwise fail deep in the pipeline.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
