//! Mock implementations for testing.
//!
//! This module provides a scripted stage executor and a mock LLM client that
//! can be used across different test files without duplication.

use async_trait::async_trait;
use parking_lot::Mutex;
use research_crew::agents::{StageExecutor, StageOutcome, StageRequest};
use research_crew::llm::LLMClient;
use research_crew::types::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// What a [`ScriptedExecutor`] does when asked to perform a stage.
#[derive(Clone)]
pub enum Script {
    /// Return the text
    Reply(String),
    /// Return an error built by the function
    Fail(fn() -> AppError),
    /// Sleep, then return the text
    Slow(Duration, String),
    /// Fail with an LLM error the first `n` times, then return the text
    Flaky(u32, String),
}

/// One call made to a [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub stage: String,
    pub role: String,
    pub system_prompt: String,
    pub instruction: String,
    pub tools: Vec<String>,
}

/// Stage executor that replays canned behaviour per stage and records every
/// call in order.
///
/// Stages without a script reply with `"<stage> output"`.
///
/// # Examples
///
/// ```ignore
/// let executor = ScriptedExecutor::new()
///     .reply("Plan", "plan-A")
///     .fail("Search", || AppError::LLM("boom".into()));
/// ```
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: HashMap<String, Script>,
    invocations: Mutex<Vec<Invocation>>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies `plan-A`, `search-B`, `integrate-C`, `report-D`.
    pub fn canned() -> Self {
        Self::new()
            .reply("Plan", "plan-A")
            .reply("Search", "search-B")
            .reply("Integrate", "integrate-C")
            .reply("Report", "report-D")
    }

    pub fn reply(self, stage: &str, text: &str) -> Self {
        self.script(stage, Script::Reply(text.to_string()))
    }

    pub fn fail(self, stage: &str, error: fn() -> AppError) -> Self {
        self.script(stage, Script::Fail(error))
    }

    pub fn slow(self, stage: &str, delay: Duration, text: &str) -> Self {
        self.script(stage, Script::Slow(delay, text.to_string()))
    }

    pub fn flaky(self, stage: &str, failures: u32, text: &str) -> Self {
        self.script(stage, Script::Flaky(failures, text.to_string()))
    }

    fn script(mut self, stage: &str, script: Script) -> Self {
        self.scripts.insert(stage.to_string(), script);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Stage names in the order they were invoked.
    pub fn stages_invoked(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(|i| i.stage.clone())
            .collect()
    }

    pub fn instruction_for(&self, stage: &str) -> Option<String> {
        self.invocations
            .lock()
            .iter()
            .find(|i| i.stage == stage)
            .map(|i| i.instruction.clone())
    }
}

#[async_trait]
impl StageExecutor for ScriptedExecutor {
    async fn execute(&self, request: &StageRequest<'_>) -> Result<StageOutcome> {
        self.invocations.lock().push(Invocation {
            stage: request.stage.to_string(),
            role: request.role.name.clone(),
            system_prompt: request.role.system_prompt(),
            instruction: request.instruction.to_string(),
            tools: request.tools.iter().map(|t| t.name.clone()).collect(),
        });

        let attempt = {
            let mut attempts = self.attempts.lock();
            let n = attempts.entry(request.stage.to_string()).or_insert(0);
            *n += 1;
            *n
        };

        let outcome = |text: String| StageOutcome {
            role: request.role.name.clone(),
            text,
        };

        match self.scripts.get(request.stage) {
            None => Ok(outcome(format!("{} output", request.stage))),
            Some(Script::Reply(text)) => Ok(outcome(text.clone())),
            Some(Script::Fail(error)) => Err(error()),
            Some(Script::Slow(delay, text)) => {
                tokio::time::sleep(*delay).await;
                Ok(outcome(text.clone()))
            }
            Some(Script::Flaky(failures, text)) => {
                if attempt <= *failures {
                    Err(AppError::LLM(format!("transient failure {}", attempt)))
                } else {
                    Ok(outcome(text.clone()))
                }
            }
        }
    }
}

/// Mock LLM client for testing with configurable responses.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
