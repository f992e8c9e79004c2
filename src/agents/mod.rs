//! LLM-backed collaborators
//!
//! Each agent wraps one [`LLMClient`](crate::llm::LLMClient) with a fixed
//! prompt and turns its free-text output into the value the pipeline expects.

pub mod generator;
pub mod grader;
pub mod rewriter;

pub use generator::LlmAnswerGenerator;
pub use grader::LlmRelevanceJudge;
pub use rewriter::LlmQueryRewriter;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::llm::LLMClient;
    use crate::types::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Returns a fixed reply and records every prompt it receives.
    pub struct ScriptedLlm {
        reply: String,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedLlm {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
            self.prompts.clone()
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
            self.generate(prompt).await
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }
}
