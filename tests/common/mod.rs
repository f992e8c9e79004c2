//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use crag::{Collaborators, CorrectionOrchestrator, PipelineSettings};
use mocks::{StubGenerator, StubJudge, StubRewriter, StubStore, StubWebSearch};
use std::sync::Arc;
use std::time::Duration;

/// Handles on every stub so tests can inspect calls after a run.
pub struct Harness {
    pub store: Arc<StubStore>,
    pub judge: Arc<StubJudge>,
    pub rewriter: Arc<StubRewriter>,
    pub web_search: Arc<StubWebSearch>,
    pub generator: Arc<StubGenerator>,
}

impl Harness {
    pub fn new(
        store: StubStore,
        judge: StubJudge,
        rewriter: StubRewriter,
        web_search: StubWebSearch,
        generator: StubGenerator,
    ) -> Self {
        Self {
            store: Arc::new(store),
            judge: Arc::new(judge),
            rewriter: Arc::new(rewriter),
            web_search: Arc::new(web_search),
            generator: Arc::new(generator),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            judge: self.judge.clone(),
            rewriter: self.rewriter.clone(),
            web_search: self.web_search.clone(),
            generator: self.generator.clone(),
        }
    }

    pub fn orchestrator(&self) -> CorrectionOrchestrator {
        self.orchestrator_with(test_settings())
    }

    pub fn orchestrator_with(&self, settings: PipelineSettings) -> CorrectionOrchestrator {
        CorrectionOrchestrator::new(self.collaborators(), settings)
    }
}

/// Default settings with a short timeout so slow stubs trip it quickly.
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        call_timeout: Duration::from_millis(500),
        ..PipelineSettings::default()
    }
}
