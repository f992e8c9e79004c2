use crate::{
    crag::AnswerGenerator,
    llm::LLMClient,
    types::{Passage, Result},
};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// Answer generator backed by an LLM.
pub struct LlmAnswerGenerator {
    llm: Box<dyn LLMClient>,
}

impl LlmAnswerGenerator {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(question: &str, passages: &[Passage]) -> String {
        let context = passages
            .iter()
            .map(|p| p.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("Question: {} \nContext: {} \nAnswer:", question, context)
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, question: &str, passages: &[Passage]) -> Result<String> {
        let prompt = Self::build_prompt(question, passages);
        tracing::debug!(
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            "Calling answer generator"
        );
        self.llm.generate_with_system(SYSTEM_PROMPT, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::ScriptedLlm;

    #[test]
    fn test_prompt_joins_passages_in_order() {
        let passages = vec![
            Passage::indexed("first chunk"),
            Passage::indexed("   "),
            Passage::web("web snippet").with_reference("https://example.com"),
        ];
        let prompt = LlmAnswerGenerator::build_prompt("what?", &passages);
        assert_eq!(
            prompt,
            "Question: what? \nContext: first chunk\n\nweb snippet \nAnswer:"
        );
    }

    #[test]
    fn test_prompt_without_passages() {
        let prompt = LlmAnswerGenerator::build_prompt("what?", &[]);
        assert_eq!(prompt, "Question: what? \nContext:  \nAnswer:");
    }

    #[tokio::test]
    async fn test_generate_passes_output_through() {
        let generator = LlmAnswerGenerator::new(Box::new(ScriptedLlm::new("Agents plan.")));
        let answer = generator
            .generate("what do agents do?", &[Passage::indexed("Agents plan.")])
            .await
            .unwrap();
        assert_eq!(answer, "Agents plan.");
    }
}
