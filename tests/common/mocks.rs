//! Stub collaborators for pipeline tests.
//!
//! Every stub counts its calls and records what it was given, and can be set
//! up to fail or to stall past the pipeline timeout.

use async_trait::async_trait;
use crag::crag::{AnswerGenerator, DocumentStore, QueryRewriter, RelevanceJudge, WebSearchProvider};
use crag::types::{AppError, Passage, Result, WebSnippet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Longer than any timeout the tests configure.
pub const STALL: Duration = Duration::from_secs(30);

// ============= Document store =============

pub struct StubStore {
    passages: Vec<Passage>,
    should_fail: bool,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StubStore {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            should_fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Store returning passages with the given contents.
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Passage::indexed(*t)).collect())
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::empty()
        }
    }

    pub fn stalled() -> Self {
        Self::empty().with_delay(STALL)
    }

    /// Answer only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for StubStore {
    async fn retrieve(&self, _question: &str) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::Store("Mock store failure".to_string()));
        }
        Ok(self.passages.clone())
    }
}

// ============= Relevance judge =============

/// Behaviour is chosen per passage by substring match.
pub struct StubJudge {
    relevant_marker: Option<String>,
    fail_marker: Option<String>,
    stall_marker: Option<String>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl StubJudge {
    fn blank() -> Self {
        Self {
            relevant_marker: None,
            fail_marker: None,
            stall_marker: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every passage is relevant.
    pub fn all_relevant() -> Self {
        Self::relevant_if("")
    }

    /// No passage is relevant.
    pub fn none_relevant() -> Self {
        Self::blank()
    }

    /// Relevant iff the passage contains `marker`.
    pub fn relevant_if(marker: &str) -> Self {
        Self {
            relevant_marker: Some(marker.to_string()),
            ..Self::blank()
        }
    }

    /// Errors on passages containing `marker`.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Never answers for passages containing `marker`.
    pub fn stalling_on(mut self, marker: &str) -> Self {
        self.stall_marker = Some(marker.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matches(marker: &Option<String>, passage: &str) -> bool {
        marker.as_deref().is_some_and(|m| passage.contains(m))
    }
}

#[async_trait]
impl RelevanceJudge for StubJudge {
    async fn grade(&self, _question: &str, passage: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Yield so concurrent judgments overlap
        tokio::time::sleep(Duration::from_millis(10)).await;
        if Self::matches(&self.stall_marker, passage) {
            tokio::time::sleep(STALL).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if Self::matches(&self.fail_marker, passage) {
            return Err(AppError::LLM("Mock judge failure".to_string()));
        }
        Ok(Self::matches(&self.relevant_marker, passage))
    }
}

// ============= Query rewriter =============

pub struct StubRewriter {
    output: String,
    should_fail: bool,
    pub received: Mutex<Vec<String>>,
}

impl StubRewriter {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            should_fail: false,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryRewriter for StubRewriter {
    async fn rewrite(&self, question: &str) -> Result<String> {
        self.received.lock().unwrap().push(question.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock rewriter failure".to_string()));
        }
        Ok(self.output.clone())
    }
}

// ============= Web search =============

pub struct StubWebSearch {
    results: Vec<WebSnippet>,
    should_fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl StubWebSearch {
    pub fn new(results: Vec<WebSnippet>) -> Self {
        Self {
            results,
            should_fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Results with the given snippet texts and `https://web.test/{n}` urls.
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .enumerate()
                .map(|(n, t)| WebSnippet {
                    content: t.to_string(),
                    url: Some(format!("https://web.test/{}", n)),
                    title: None,
                })
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearchProvider for StubWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.should_fail {
            return Err(AppError::Search("Mock search failure".to_string()));
        }
        Ok(self.results.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

// ============= Answer generator =============

pub struct StubGenerator {
    answer: String,
    should_fail: bool,
    /// (question, passages) per call
    pub received: Mutex<Vec<(String, Vec<Passage>)>>,
}

impl StubGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            should_fail: false,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn last_passages(&self) -> Vec<Passage> {
        self.received
            .lock()
            .unwrap()
            .last()
            .map(|(_, p)| p.clone())
            .unwrap_or_default()
    }

    pub fn last_question(&self) -> Option<String> {
        self.received.lock().unwrap().last().map(|(q, _)| q.clone())
    }
}

#[async_trait]
impl AnswerGenerator for StubGenerator {
    async fn generate(&self, question: &str, passages: &[Passage]) -> Result<String> {
        self.received
            .lock()
            .unwrap()
            .push((question.to_string(), passages.to_vec()));
        if self.should_fail {
            return Err(AppError::LLM("Mock generator failure".to_string()));
        }
        Ok(self.answer.clone())
    }
}
