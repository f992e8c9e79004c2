//! Pipeline state and the transition table.

use crate::crag::outcome::PipelineStep;
use crate::types::Passage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// States of the correction state machine.
///
/// The only branch is at [`Stage::Graded`]; there is no edge back into
/// grading, so a question passes through the corrective path at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Retrieved,
    Graded,
    Rewritten,
    Augmented,
    Answered,
}

impl Stage {
    /// Next state given the grading outcome. `None` once answered.
    pub fn next(self, needs_correction: bool) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::Retrieved),
            Stage::Retrieved => Some(Stage::Graded),
            Stage::Graded if needs_correction => Some(Stage::Rewritten),
            Stage::Graded => Some(Stage::Answered),
            Stage::Rewritten => Some(Stage::Augmented),
            Stage::Augmented => Some(Stage::Answered),
            Stage::Answered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Answered
    }

    /// The collaborator step whose side effect produces this stage.
    pub fn produced_by(self) -> Option<PipelineStep> {
        match self {
            Stage::Start => None,
            Stage::Retrieved => Some(PipelineStep::Retrieve),
            Stage::Graded => Some(PipelineStep::Grade),
            Stage::Rewritten => Some(PipelineStep::Rewrite),
            Stage::Augmented => Some(PipelineStep::WebSearch),
            Stage::Answered => Some(PipelineStep::Generate),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Retrieved => "retrieved",
            Stage::Graded => "graded",
            Stage::Rewritten => "rewritten",
            Stage::Augmented => "augmented",
            Stage::Answered => "answered",
        };
        write!(f, "{}", name)
    }
}

/// Data threaded through every step of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    /// Working question; only the rewrite step replaces it.
    pub question: String,
    /// The question as asked. Never mutated.
    pub original_question: String,
    pub documents: Vec<Passage>,
    /// Meaningful once `stage` has reached [`Stage::Graded`].
    pub needs_correction: bool,
    /// Set exactly once, on entering [`Stage::Answered`].
    pub answer: Option<String>,
    /// The generator returned nothing and the fallback message was used.
    pub fallback_used: bool,
    pub stage: Stage,
}

impl PipelineState {
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            original_question: question.clone(),
            question,
            documents: Vec::new(),
            needs_correction: false,
            answer: None,
            fallback_used: false,
            stage: Stage::Start,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// One entry of the transition trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    /// Unix timestamp when the stage was entered
    pub timestamp: i64,
    /// Time spent in the step that produced this stage
    pub duration_ms: u64,
}
