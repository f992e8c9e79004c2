use crate::crag::outcome::{FailureKind, StepError};
use serde::{Deserialize, Serialize};

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryInput {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============= Passage Types =============

/// Where a passage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassageSource {
    /// Returned by the document store.
    Indexed,
    /// Appended by web-search augmentation.
    Web,
}

/// A unit of text considered as evidence for answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub source: PassageSource,
    /// Chunk id for indexed passages, URL for web passages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Passage {
    pub fn indexed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: PassageSource::Indexed,
            reference: None,
        }
    }

    pub fn web(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: PassageSource::Web,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A single result from a web-search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSnippet {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Pipeline(#[from] StepError),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let body = match &self {
            AppError::Pipeline(err) => serde_json::json!({
                "error": err.to_string(),
                "step": err.step,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };

        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(err) => match err.kind {
                FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                FailureKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                FailureKind::Collaborator | FailureKind::InvalidOutput => StatusCode::BAD_GATEWAY,
            },
            AppError::LLM(_)
            | AppError::Search(_)
            | AppError::Store(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
