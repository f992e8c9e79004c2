//! Correction orchestrator
//!
//! Runs one question through retrieve -> grade -> (rewrite -> web search) ->
//! generate. Each call to [`CorrectionOrchestrator::step`] performs exactly one
//! transition of [`Stage`]; [`CorrectionOrchestrator::run`] steps until the
//! answer is produced or a step fails.

use crate::crag::collaborators::Collaborators;
use crate::crag::outcome::{FailureKind, PipelineStep, StepError, Verdict};
use crate::crag::state::{PipelineState, Stage, StageRecord};
use crate::types::{AppError, Passage, WebSnippet};
use crate::utils::toml_config::{default_fallback_answer, CragConfig};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runtime limits and policies for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Timeout applied to every collaborator call, including each judgment
    pub call_timeout: Duration,
    /// Relevance judgments in flight at once
    pub grading_concurrency: usize,
    /// Substituted when the generator returns an empty answer
    pub fallback_answer: String,
    /// Join all web snippets into one passage
    pub merge_web_results: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            grading_concurrency: 4,
            fallback_answer: default_fallback_answer(),
            merge_web_results: false,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &CragConfig) -> Self {
        Self {
            call_timeout: Duration::from_secs(config.pipeline.call_timeout_secs),
            grading_concurrency: config.pipeline.grading_concurrency,
            fallback_answer: config.pipeline.fallback_answer.clone(),
            merge_web_results: config.web_search.merge_results,
        }
    }
}

/// Result of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CragOutput {
    pub answer: String,
    pub original_question: String,
    /// The question generation saw; differs from the original after a rewrite
    pub final_question: String,
    /// Whether the corrective path (rewrite + web search) ran
    pub corrected: bool,
    pub used_fallback: bool,
    /// Passages handed to the generator
    pub documents: Vec<Passage>,
    /// Every stage entered, in order
    pub path: Vec<StageRecord>,
}

impl CragOutput {
    pub fn stages(&self) -> Vec<Stage> {
        self.path.iter().map(|r| r.stage).collect()
    }
}

/// Sequences the collaborators for one question at a time.
///
/// Holds no per-request state, so a single instance can serve any number of
/// concurrent requests.
pub struct CorrectionOrchestrator {
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl CorrectionOrchestrator {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Answer a question. This is the service contract: a non-empty answer or
    /// an error.
    pub async fn answer(&self, question: &str) -> crate::types::Result<String> {
        Ok(self.run(question).await?.answer)
    }

    /// Run the full pipeline for a question.
    pub async fn run(&self, question: &str) -> crate::types::Result<CragOutput> {
        self.run_with_cancellation(question, &CancellationToken::new())
            .await
    }

    /// Run the pipeline, stopping before the next transition once `cancel`
    /// fires. An in-flight collaborator call is allowed to finish.
    ///
    /// The question is trimmed; a blank question is rejected before any
    /// collaborator is called.
    pub async fn run_with_cancellation(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> crate::types::Result<CragOutput> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("Question must not be empty".into()));
        }
        Ok(self.drive(question, cancel).await?)
    }

    #[tracing::instrument(name = "crag", skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
    async fn drive(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<CragOutput, StepError> {
        info!(question = %question, "Starting corrective RAG pipeline");

        let mut state = PipelineState::new(question);
        let mut path = vec![StageRecord {
            stage: Stage::Start,
            timestamp: Utc::now().timestamp(),
            duration_ms: 0,
        }];

        while !state.stage.is_terminal() {
            if cancel.is_cancelled() {
                let pending = state
                    .stage
                    .next(state.needs_correction)
                    .and_then(Stage::produced_by)
                    .unwrap_or(PipelineStep::Generate);
                warn!(stage = %state.stage, "Request cancelled, abandoning pipeline");
                return Err(StepError::cancelled(pending));
            }

            let started = Instant::now();
            let timestamp = Utc::now().timestamp();
            let stage = self.step(&mut state).await?;
            let duration_ms = started.elapsed().as_millis() as u64;

            info!(stage = %stage, duration_ms, "Pipeline transition");
            path.push(StageRecord {
                stage,
                timestamp,
                duration_ms,
            });
        }

        let answer = state
            .answer
            .clone()
            .unwrap_or_else(|| self.settings.fallback_answer.clone());

        Ok(CragOutput {
            answer,
            corrected: path.iter().any(|r| r.stage == Stage::Rewritten),
            used_fallback: state.fallback_used,
            original_question: state.original_question,
            final_question: state.question,
            documents: state.documents,
            path,
        })
    }

    /// Perform one transition. Returns the stage entered, or the current stage
    /// unchanged if the state is already terminal.
    pub async fn step(&self, state: &mut PipelineState) -> Result<Stage, StepError> {
        let Some(next) = state.stage.next(state.needs_correction) else {
            return Ok(state.stage);
        };

        match next {
            Stage::Retrieved => self.retrieve(state).await?,
            Stage::Graded => self.grade(state).await,
            Stage::Rewritten => self.rewrite(state).await?,
            Stage::Augmented => self.augment(state).await?,
            Stage::Answered => self.generate(state).await?,
            // never a successor
            Stage::Start => {}
        }

        state.stage = next;
        Ok(next)
    }

    async fn retrieve(&self, state: &mut PipelineState) -> Result<(), StepError> {
        let documents = self
            .call(
                PipelineStep::Retrieve,
                self.collaborators.store.retrieve(&state.question),
            )
            .await?;

        info!(passages = documents.len(), "Retrieved documents");
        state.documents = documents;
        Ok(())
    }

    async fn grade(&self, state: &mut PipelineState) {
        let retrieved = std::mem::take(&mut state.documents);
        let total = retrieved.len();

        let graded = self.grade_passages(&state.question, retrieved).await;

        let mut kept = Vec::with_capacity(total);
        let mut dropped = 0usize;
        for (index, (passage, verdict)) in graded.into_iter().enumerate() {
            if verdict.is_relevant() {
                debug!(index, "Passage graded as relevant");
                kept.push(passage);
                continue;
            }
            match verdict {
                Verdict::Failed(reason) => {
                    warn!(index, error = %reason, "Relevance judge failed, treating passage as not relevant");
                }
                _ => debug!(index, "Passage graded as NOT relevant"),
            }
            dropped += 1;
        }

        // An empty retrieval is never adequate evidence
        state.needs_correction = total == 0 || dropped > 0;
        state.documents = kept;

        info!(
            retrieved = total,
            kept = state.documents.len(),
            needs_correction = state.needs_correction,
            "Graded documents"
        );
    }

    /// Judge every passage independently. Order of the input is preserved.
    pub async fn grade_passages(
        &self,
        question: &str,
        passages: Vec<Passage>,
    ) -> Vec<(Passage, Verdict)> {
        let judge = &self.collaborators.judge;
        let timeout = self.settings.call_timeout;

        stream::iter(passages)
            .map(|passage| async move {
                if passage.content.trim().is_empty() {
                    return (passage, Verdict::NotRelevant);
                }
                let verdict =
                    match tokio::time::timeout(timeout, judge.grade(question, &passage.content))
                        .await
                    {
                        Ok(Ok(true)) => Verdict::Relevant,
                        Ok(Ok(false)) => Verdict::NotRelevant,
                        Ok(Err(e)) => Verdict::Failed(e.to_string()),
                        Err(_) => Verdict::Failed(format!(
                            "no verdict within {}s",
                            timeout.as_secs_f32()
                        )),
                    };
                (passage, verdict)
            })
            .buffered(self.settings.grading_concurrency.max(1))
            .collect()
            .await
    }

    async fn rewrite(&self, state: &mut PipelineState) -> Result<(), StepError> {
        let rewritten = self
            .call(
                PipelineStep::Rewrite,
                self.collaborators.rewriter.rewrite(&state.question),
            )
            .await?;

        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            error!("Query rewriter returned an empty question");
            return Err(StepError::new(
                PipelineStep::Rewrite,
                FailureKind::InvalidOutput,
                "rewriter returned an empty question",
            ));
        }

        info!(from = %state.question, to = %rewritten, "Transformed query");
        state.question = rewritten.to_string();
        Ok(())
    }

    async fn augment(&self, state: &mut PipelineState) -> Result<(), StepError> {
        let web_search = &self.collaborators.web_search;
        let snippets = self
            .call(PipelineStep::WebSearch, web_search.search(&state.question))
            .await?;

        let count = snippets.len();
        let passages = web_passages(snippets, self.settings.merge_web_results);

        info!(
            provider = web_search.name(),
            results = count,
            appended = passages.len(),
            "Web search completed"
        );
        state.documents.extend(passages);
        Ok(())
    }

    async fn generate(&self, state: &mut PipelineState) -> Result<(), StepError> {
        info!(passages = state.documents.len(), "Generating response");

        let generation = self
            .call(
                PipelineStep::Generate,
                self.collaborators
                    .generator
                    .generate(&state.question, &state.documents),
            )
            .await?;

        let generation = generation.trim();
        if generation.is_empty() {
            warn!("Generator returned an empty answer, using fallback message");
            state.answer = Some(self.settings.fallback_answer.clone());
            state.fallback_used = true;
        } else {
            state.answer = Some(generation.to_string());
        }
        Ok(())
    }

    /// Await a step-level collaborator call under the configured timeout.
    async fn call<T, F>(&self, step: PipelineStep, fut: F) -> Result<T, StepError>
    where
        F: Future<Output = crate::types::Result<T>>,
    {
        match tokio::time::timeout(self.settings.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(step = %step, error = %e, "Pipeline step failed");
                Err(StepError::new(step, FailureKind::Collaborator, e.to_string()))
            }
            Err(_) => {
                error!(step = %step, "Pipeline step timed out");
                Err(StepError::new(
                    step,
                    FailureKind::Timeout,
                    format!(
                        "no response within {}s",
                        self.settings.call_timeout.as_secs_f32()
                    ),
                ))
            }
        }
    }
}

/// Convert web snippets into passages, dropping empty ones.
fn web_passages(snippets: Vec<WebSnippet>, merge: bool) -> Vec<Passage> {
    let snippets: Vec<WebSnippet> = snippets
        .into_iter()
        .filter(|s| !s.content.trim().is_empty())
        .collect();

    if merge {
        if snippets.is_empty() {
            return Vec::new();
        }
        let joined = snippets
            .iter()
            .map(|s| s.content.trim())
            .collect::<Vec<_>>()
            .join("\n");
        return vec![Passage::web(joined)];
    }

    snippets
        .into_iter()
        .map(|s| {
            let passage = Passage::web(s.content.trim());
            match s.url {
                Some(url) => passage.with_reference(url),
                None => passage,
            }
        })
        .collect()
}
