//! TOML-based configuration for the CRAG server
//!
//! Providers, models, collaborator roles, the document store, web search and
//! pipeline limits are declared in a TOML file (`crag.toml`). Secrets are never
//! stored in the file: each one is referenced by the name of the environment
//! variable that holds it.
//!
//! The configuration is read once at start-up; collaborator clients are
//! built from it a single time and shared by every request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from crag.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CragConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Named LLM provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,

    /// Which model backs each LLM collaborator
    pub roles: RolesConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub web_search: WebSearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        /// Used by models that do not name one
        #[serde(default)]
        default_model: Option<String>,
    },
    /// Any OpenAI-compatible chat completions endpoint (OpenAI, Groq, ...)
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default)]
        default_model: Option<String>,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider. Falls back to the
    /// provider's `default_model`.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub temperature: f32,
}

// ============= Role Configuration =============

/// Model names (keys of [models]) used by each LLM-backed collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesConfig {
    pub judge: String,
    pub rewriter: String,
    pub generator: String,
}

impl RolesConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("judge", self.judge.as_str()),
            ("rewriter", self.rewriter.as_str()),
            ("generator", self.generator.as_str()),
        ]
        .into_iter()
    }
}

// ============= Document Store Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of .txt/.md files indexed at start-up
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages returned per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("./data/corpus")
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    80
}

fn default_top_k() -> usize {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

// ============= Web Search Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchKind {
    #[default]
    Tavily,
    DuckDuckGo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub provider: WebSearchKind,

    /// Environment variable containing the Tavily API key
    #[serde(default = "default_tavily_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_tavily_base")]
    pub api_base: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Join every snippet into a single web passage instead of one each
    #[serde(default)]
    pub merge_results: bool,
}

fn default_tavily_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_tavily_base() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> usize {
    3
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            provider: WebSearchKind::default(),
            api_key_env: default_tavily_key_env(),
            api_base: default_tavily_base(),
            max_results: default_max_results(),
            merge_results: false,
        }
    }
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Timeout applied to every collaborator call
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Relevance judgments in flight at once
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,

    /// Returned when the generator produces an empty answer
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,
}

fn default_call_timeout() -> u64 {
    30
}

fn default_grading_concurrency() -> usize {
    4
}

pub(crate) fn default_fallback_answer() -> String {
    "No answer generated. Please refine your query.".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout(),
            grading_concurrency: default_grading_concurrency(),
            fallback_answer: default_fallback_answer(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by role '{1}' does not exist")]
    MissingModel(String, String),
}

impl CragConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Parse without validating
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate internal references, limits, and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_references()?;
        self.validate_limits()?;

        // Only providers that some role actually uses need their secrets
        for (_, model_name) in self.roles.iter() {
            if let Some(model) = self.models.get(model_name) {
                if let Some(ProviderConfig::OpenAI { api_key_env, .. }) =
                    self.providers.get(&model.provider)
                {
                    self.validate_env_var(api_key_env)?;
                }
            }
        }

        if self.web_search.provider == WebSearchKind::Tavily {
            self.validate_env_var(&self.web_search.api_key_env)?;
        }

        Ok(())
    }

    fn validate_references(&self) -> Result<(), ConfigError> {
        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
        }

        for model_name in self.models.keys() {
            if self.model_id(model_name).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}' has no `model` and its provider has no `default_model`",
                    model_name
                )));
            }
        }

        for (role, model_name) in self.roles.iter() {
            if !self.models.contains_key(model_name) {
                return Err(ConfigError::MissingModel(
                    model_name.to_string(),
                    role.to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ConfigError> {
        if self.store.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "store.chunk_size must be greater than zero".into(),
            ));
        }
        if self.store.chunk_overlap >= self.store.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "store.chunk_overlap ({}) must be smaller than store.chunk_size ({})",
                self.store.chunk_overlap, self.store.chunk_size
            )));
        }
        if self.store.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "store.top_k must be greater than zero".into(),
            ));
        }
        if self.web_search.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "web_search.max_results must be greater than zero".into(),
            ));
        }
        if self.pipeline.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.call_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.pipeline.grading_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.grading_concurrency must be greater than zero".into(),
            ));
        }
        if self.pipeline.fallback_answer.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.fallback_answer must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get model by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Identifier sent to the provider for a named model.
    pub fn model_id(&self, name: &str) -> Option<&str> {
        let model = self.models.get(name)?;
        if let Some(id) = model.model.as_deref() {
            return Some(id);
        }
        match self.providers.get(&model.provider)? {
            ProviderConfig::Ollama { default_model, .. }
            | ProviderConfig::OpenAI { default_model, .. } => default_model.as_deref(),
        }
    }
}
