//! # CRAG Server - Corrective Retrieval Augmented Generation
//!
//! Answers questions from a local corpus and corrects itself when the
//! retrieved evidence is weak: an LLM judge grades every retrieved passage,
//! and if any is rejected the question is rewritten once and supplemented with
//! a live web search before the answer is generated.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use crag::{build_collaborators, CorrectionOrchestrator, CragConfig, PipelineSettings};
//!
//! let config = CragConfig::load("crag.toml")?;
//! let orchestrator = CorrectionOrchestrator::new(
//!     build_collaborators(&config)?,
//!     PipelineSettings::from_config(&config),
//! );
//!
//! let output = orchestrator.run("What are the types of agent memory?").await?;
//! println!("{}", output.answer);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints (default) |
//!
//! ## Modules
//!
//! - [`crag`] - State machine, collaborator traits and the orchestrator
//! - [`agents`] - LLM-backed judge, rewriter and generator
//! - [`rag`] - Local corpus store with BM25 retrieval
//! - [`tools`] - Web search providers
//! - [`llm`] - LLM client implementations
//! - [`api`] - REST API handlers and routes
//! - [`types`] - Common types and error handling

#![warn(rustdoc::missing_crate_level_docs)]

/// LLM-backed collaborators (judge, rewriter, generator).
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Corrective RAG state machine and orchestrator.
pub mod crag;
/// LLM provider clients and abstractions.
pub mod llm;
/// Local document store.
pub mod rag;
/// Web search providers.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration loading.
pub mod utils;

pub use crag::{
    Collaborators, CorrectionOrchestrator, CragOutput, PipelineSettings, Stage, StepError,
};
pub use llm::{LLMClient, Provider};
pub use types::{AppError, Result};
pub use utils::toml_config::CragConfig;

use crate::agents::{LlmAnswerGenerator, LlmQueryRewriter, LlmRelevanceJudge};
use crate::crag::WebSearchProvider;
use crate::rag::InMemoryDocumentStore;
use crate::tools::{DuckDuckGoSearch, TavilySearch};
use crate::utils::toml_config::WebSearchKind;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration the server was started with
    pub config: Arc<CragConfig>,
    /// Pipeline with its collaborators, built once at start-up
    pub orchestrator: Arc<CorrectionOrchestrator>,
}

impl AppState {
    pub fn new(config: CragConfig, orchestrator: CorrectionOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build every collaborator from `config` and wrap them in an orchestrator.
    pub fn from_config(config: CragConfig) -> Result<Self> {
        let orchestrator = CorrectionOrchestrator::new(
            build_collaborators(&config)?,
            PipelineSettings::from_config(&config),
        );
        Ok(Self::new(config, orchestrator))
    }
}

/// Construct the collaborator clients described by `config`.
///
/// Loads and indexes the corpus, so call this once per process.
pub fn build_collaborators(config: &CragConfig) -> Result<Collaborators> {
    let client_for = |model_name: &str| -> Result<Box<dyn LLMClient>> {
        let provider = Provider::from_model_config(config, model_name)?;
        tracing::info!(
            model = model_name,
            model_id = provider.model(),
            provider = provider.name(),
            "Creating LLM client"
        );
        provider.create_client()
    };

    let web_search: Arc<dyn WebSearchProvider> = match config.web_search.provider {
        WebSearchKind::Tavily => {
            let api_key = config
                .resolve_env(&config.web_search.api_key_env)
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        config.web_search.api_key_env
                    ))
                })?;
            Arc::new(TavilySearch::new(
                api_key,
                config.web_search.api_base.clone(),
                config.web_search.max_results,
            ))
        }
        WebSearchKind::DuckDuckGo => {
            Arc::new(DuckDuckGoSearch::new(config.web_search.max_results))
        }
    };

    Ok(Collaborators {
        store: Arc::new(InMemoryDocumentStore::from_config(&config.store)?),
        judge: Arc::new(LlmRelevanceJudge::new(client_for(&config.roles.judge)?)),
        rewriter: Arc::new(LlmQueryRewriter::new(client_for(&config.roles.rewriter)?)),
        web_search,
        generator: Arc::new(LlmAnswerGenerator::new(client_for(&config.roles.generator)?)),
    })
}
