//! Corrective retrieval-augmented generation.
//!
//! A question is answered from indexed passages when the relevance judge
//! accepts all of them. Otherwise the question is rewritten once, a web search
//! supplements the surviving passages, and the answer is generated from that
//! combined set.

pub mod collaborators;
pub mod orchestrator;
pub mod outcome;
pub mod state;

pub use collaborators::{
    AnswerGenerator, Collaborators, DocumentStore, QueryRewriter, RelevanceJudge,
    WebSearchProvider,
};
pub use orchestrator::{CorrectionOrchestrator, CragOutput, PipelineSettings};
pub use outcome::{FailureKind, PipelineStep, StepError, Verdict};
pub use state::{PipelineState, Stage, StageRecord};
