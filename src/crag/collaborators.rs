//! Interfaces the orchestrator needs from its external collaborators.
//!
//! Each trait is a single async call. Implementations live in [`crate::agents`]
//! (LLM-backed), [`crate::rag`] (document store) and [`crate::tools`] (web
//! search); tests substitute stubs.

use crate::types::{Passage, Result, WebSnippet};
use async_trait::async_trait;
use std::sync::Arc;

/// Returns candidate passages for a question, best first. May be empty.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn retrieve(&self, question: &str) -> Result<Vec<Passage>>;
}

/// Binary relevance judgment of one passage against a question.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn grade(&self, question: &str, passage: &str) -> Result<bool>;
}

/// Reformulates a question for retrieval. Must not return an empty string.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> Result<String>;
}

/// Live web search. May return no results.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Produces the final answer. An empty string is mapped to a fallback message.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, passages: &[Passage]) -> Result<String>;
}

/// Collaborator clients, constructed once at process start and shared by
/// every request.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub judge: Arc<dyn RelevanceJudge>,
    pub rewriter: Arc<dyn QueryRewriter>,
    pub web_search: Arc<dyn WebSearchProvider>,
    pub generator: Arc<dyn AnswerGenerator>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("web_search", &self.web_search.name())
            .finish_non_exhaustive()
    }
}
