//! LLM client abstraction and provider selection
//!
//! The judge, rewriter and generator each hold one [`LLMClient`], created from
//! the model their role points at in `crag.toml`:
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint
//! - **Ollama**: local inference

use crate::types::{AppError, Result};
use crate::utils::toml_config::{CragConfig, ProviderConfig};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// OpenAI API provider (including compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     temperature: 0.0,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolve a named model from `[models]` into a concrete provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the model or its provider is not
    /// defined, or the provider's API key variable is unset.
    pub fn from_model_config(config: &CragConfig, model_name: &str) -> Result<Self> {
        let model = config.get_model(model_name).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' is not defined", model_name))
        })?;

        let provider = config.get_provider(&model.provider).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' is not defined",
                model.provider, model_name
            ))
        })?;

        let model_id = config
            .model_id(model_name)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Model '{}' has no model identifier and provider '{}' has no default_model",
                    model_name, model.provider
                ))
            })?
            .to_string();

        match provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                ..
            } => {
                let api_key = config.resolve_env(api_key_env).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model_id,
                    temperature: model.temperature,
                })
            }
            ProviderConfig::Ollama { base_url, .. } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model_id,
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's feature was not compiled in.
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Box::new(
                super::openai::OpenAIClient::new(api_key.clone(), api_base.clone(), model.clone())
                    .with_temperature(*temperature),
            )),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone())?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} support is not enabled in this build",
                other.name()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier sent to the provider
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[providers.local]
type = "ollama"
base_url = "http://127.0.0.1:11434"
default_model = "llama3.2"

[providers.hosted]
type = "openai"
api_key_env = "CRAG_CLIENT_TEST_KEY"
default_model = "gpt-4o-mini"

[models.fast]
provider = "local"

[models.smart]
provider = "hosted"
model = "gpt-4o"
temperature = 0.2

[models.orphan]
provider = "nowhere"
model = "x"

[roles]
judge = "fast"
rewriter = "fast"
generator = "fast"
"#;

    fn config() -> CragConfig {
        toml::from_str(CONFIG).unwrap()
    }

    #[test]
    fn test_resolve_ollama_model() {
        let provider = Provider::from_model_config(&config(), "fast").unwrap();
        assert_eq!(
            provider,
            Provider::Ollama {
                base_url: "http://127.0.0.1:11434".to_string(),
                model: "llama3.2".to_string(),
            }
        );
        assert_eq!(provider.name(), "Ollama");
        assert_eq!(provider.model(), "llama3.2");
    }

    #[test]
    fn test_resolve_openai_model_reads_env() {
        std::env::set_var("CRAG_CLIENT_TEST_KEY", "sk-test");
        let provider = Provider::from_model_config(&config(), "smart").unwrap();
        match provider {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => {
                assert_eq!(api_key, "sk-test");
                assert_eq!(api_base, "https://api.openai.com/v1");
                assert_eq!(model, "gpt-4o");
                assert!((temperature - 0.2).abs() < f32::EPSILON);
            }
            other => panic!("unexpected provider {:?}", other),
        }
    }

    #[test]
    fn test_unknown_model_and_provider() {
        let cfg = config();
        let err = Provider::from_model_config(&cfg, "missing").unwrap_err();
        assert!(err.to_string().contains("'missing'"));

        let err = Provider::from_model_config(&cfg, "orphan").unwrap_err();
        assert!(err.to_string().contains("'nowhere'"));
    }
}
