//! Per-step and per-item outcomes.
//!
//! Step-level failures abort the request and carry the step that failed.
//! Item-level grading failures never escalate: they become a [`Verdict::Failed`]
//! for the one passage and the pipeline carries on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The collaborator-facing steps of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Retrieve,
    Grade,
    Rewrite,
    WebSearch,
    Generate,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieve => "retrieve",
            Self::Grade => "grade",
            Self::Rewrite => "rewrite",
            Self::WebSearch => "web_search",
            Self::Generate => "generate",
        };
        write!(f, "{}", name)
    }
}

/// Reason code attached to a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The collaborator returned an error.
    Collaborator,
    /// The collaborator did not answer within the configured timeout.
    Timeout,
    /// The collaborator answered with something the contract forbids.
    InvalidOutput,
    /// The request was cancelled before the next transition.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collaborator => "collaborator error",
            Self::Timeout => "timeout",
            Self::InvalidOutput => "invalid output",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// A non-recoverable failure of one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{step} step failed ({kind}): {message}")]
pub struct StepError {
    pub step: PipelineStep,
    pub kind: FailureKind,
    pub message: String,
}

impl StepError {
    pub fn new(step: PipelineStep, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled(step: PipelineStep) -> Self {
        Self::new(step, FailureKind::Cancelled, "request cancelled")
    }
}

/// Relevance verdict for a single passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Relevant,
    NotRelevant,
    /// The judge call errored or timed out. Treated as not relevant.
    Failed(String),
}

impl Verdict {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Verdict::Relevant)
    }
}
