use crate::{
    crag::RelevanceJudge,
    llm::LLMClient,
    types::{AppError, Result},
};
use async_trait::async_trait;
use serde::Deserialize;

const SYSTEM_PROMPT: &str = r#"You are a grader assessing relevance of a retrieved document to a user question.
If the document contains keyword(s) or semantic meaning related to the question, grade it as relevant.
Give a binary score 'yes' or 'no' to indicate whether the document is relevant to the question.
Respond with JSON only, for example: {"binary_score": "yes"}"#;

#[derive(Debug, Deserialize)]
struct GradeDocuments {
    binary_score: String,
}

/// Relevance judge backed by an LLM.
pub struct LlmRelevanceJudge {
    llm: Box<dyn LLMClient>,
}

impl LlmRelevanceJudge {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Parse a verdict from LLM output
    ///
    /// Accepts:
    /// - JSON: `{"binary_score": "yes"}`, possibly wrapped in prose or a code fence
    /// - A bare word: `yes`, `No.`
    fn parse_verdict(output: &str) -> Option<bool> {
        let score = match extract_json(output) {
            Some(json) => serde_json::from_str::<GradeDocuments>(json).ok()?.binary_score,
            None => output.to_string(),
        };

        let word = score
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        match word.as_str() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        }
    }
}

/// Slice from the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[async_trait]
impl RelevanceJudge for LlmRelevanceJudge {
    async fn grade(&self, question: &str, passage: &str) -> Result<bool> {
        let prompt = format!(
            "Retrieved document: \n\n {} \n\n User question: {}",
            passage, question
        );
        let response = self.llm.generate_with_system(SYSTEM_PROMPT, &prompt).await?;

        Self::parse_verdict(&response).ok_or_else(|| {
            AppError::LLM(format!(
                "Unrecognised relevance verdict from {}: '{}'",
                self.llm.model_name(),
                response.trim()
            ))
        })
    }
}
