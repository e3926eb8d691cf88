use crate::agents::{StageExecutor, StageOutcome, StageRequest};
use crate::llm::LLMClient;
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Executes each stage with a single chat completion: the role's persona as
/// the system prompt, the rendered instruction as the user message.
pub struct LlmExecutor {
    llm: Arc<dyn LLMClient>,
}

impl LlmExecutor {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// User message sent for a stage.
    pub fn task_prompt(request: &StageRequest<'_>) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            request.instruction, request.expected_output
        );

        if !request.tools.is_empty() {
            prompt.push_str("\n\nResources already consulted for you:");
            for tool in request.tools {
                prompt.push_str(&format!("\n- {}: {}", tool.name, tool.description));
            }
        }

        prompt
    }
}

#[async_trait]
impl StageExecutor for LlmExecutor {
    async fn execute(&self, request: &StageRequest<'_>) -> Result<StageOutcome> {
        tracing::debug!(
            stage = request.stage,
            role = %request.role.name,
            model = self.llm.model_name(),
            "executing stage"
        );

        let text = self
            .llm
            .generate_with_system(&request.role.system_prompt(), &Self::task_prompt(request))
            .await?;

        Ok(StageOutcome {
            role: request.role.name.clone(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;
    use crate::tools::FileResource;
    use crate::types::AppError;
    use parking_lot::Mutex;

    /// Records the last (system, prompt) pair it was given.
    struct RecordingLlm {
        seen: Mutex<Option<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl LLMClient for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.generate_with_system("", prompt).await
        }

        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            *self.seen.lock() = Some((system.to_string(), prompt.to_string()));
            if self.fail {
                return Err(AppError::LLM("rate limited".to_string()));
            }
            Ok("an answer".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_persona_is_system_prompt_and_instruction_is_user_message() {
        let llm = Arc::new(RecordingLlm {
            seen: Mutex::new(None),
            fail: false,
        });
        let executor = LlmExecutor::new(llm.clone());
        let role = Role::new("Planner", "plan well", "A strategist.", Vec::new());

        let outcome = executor
            .execute(&StageRequest {
                stage: "Plan",
                role: &role,
                instruction: "Break down: what is a hash?",
                expected_output: "A list of sub-questions",
                tools: &[],
            })
            .await
            .unwrap();

        assert_eq!(outcome.role, "Planner");
        assert_eq!(outcome.text, "an answer");

        let (system, prompt) = llm.seen.lock().clone().unwrap();
        assert!(system.contains("A strategist."));
        assert!(prompt.starts_with("Break down: what is a hash?"));
        assert!(prompt.contains("A list of sub-questions"));
        assert!(!prompt.contains("Resources"));
    }

    #[tokio::test]
    async fn test_granted_tools_are_listed() {
        let llm = Arc::new(RecordingLlm {
            seen: Mutex::new(None),
            fail: false,
        });
        let executor = LlmExecutor::new(llm.clone());
        let role = Role::new("Searcher", "search", "A researcher.", Vec::new());
        let tools = vec![FileResource::new("texto.txt").tool_definition()];

        executor
            .execute(&StageRequest {
                stage: "Search",
                role: &role,
                instruction: "Find facts",
                expected_output: "Facts",
                tools: &tools,
            })
            .await
            .unwrap();

        let (_, prompt) = llm.seen.lock().clone().unwrap();
        assert!(prompt.contains("TextFileReadTool"));
    }

    #[tokio::test]
    async fn test_llm_errors_propagate() {
        let llm = Arc::new(RecordingLlm {
            seen: Mutex::new(None),
            fail: true,
        });
        let executor = LlmExecutor::new(llm);
        let role = Role::new("Reporter", "report", "A writer.", Vec::new());

        let err = executor
            .execute(&StageRequest {
                stage: "Report",
                role: &role,
                instruction: "Write",
                expected_output: "Text",
                tools: &[],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
    }
}
