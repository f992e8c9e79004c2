use crate::{
    crag::QueryRewriter,
    llm::LLMClient,
    types::{AppError, Result},
};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are a question re-writer that converts an input question to a better version \
optimized for web search. Look at the input and try to reason about the underlying semantic intent. \
Respond with the improved question only.";

/// Labels models like to put in front of the rewritten question.
const PREFIXES: &[&str] = &[
    "improved question:",
    "rewritten question:",
    "better question:",
    "question:",
];

/// Query rewriter backed by an LLM.
pub struct LlmQueryRewriter {
    llm: Box<dyn LLMClient>,
}

impl LlmQueryRewriter {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Reduce LLM output to the bare question: first non-empty line, label
    /// and surrounding quotes removed.
    fn clean(output: &str) -> String {
        let line = output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default();

        let is_noise = |c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*');

        let mut line = line.trim_matches(is_noise);
        for prefix in PREFIXES {
            let labelled = line
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if labelled {
                line = &line[prefix.len()..];
                break;
            }
        }

        line.trim_matches(is_noise).to_string()
    }
}

#[async_trait]
impl QueryRewriter for LlmQueryRewriter {
    async fn rewrite(&self, question: &str) -> Result<String> {
        let prompt = format!(
            "Here is the initial question: \n\n {} \n Formulate an improved question.",
            question
        );
        let response = self.llm.generate_with_system(SYSTEM_PROMPT, &prompt).await?;

        let rewritten = Self::clean(&response);
        if rewritten.is_empty() {
            return Err(AppError::LLM(format!(
                "{} returned an empty rewrite",
                self.llm.model_name()
            )));
        }
        Ok(rewritten)
    }
}
