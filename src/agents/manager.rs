//! Hierarchical process
//!
//! A manager model looks at each stage and picks which delegation-eligible
//! role should perform it. The pipeline's stage order is never affected; the
//! manager only decides *who* executes the current stage.

use crate::agents::{Crew, Role, StageExecutor, StageOutcome, StageRequest};
use crate::llm::LLMClient;
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub struct ManagerExecutor {
    manager: Arc<dyn LLMClient>,
    crew: Crew,
    inner: Arc<dyn StageExecutor>,
}

impl ManagerExecutor {
    pub fn new(manager: Arc<dyn LLMClient>, crew: Crew, inner: Arc<dyn StageExecutor>) -> Self {
        Self {
            manager,
            crew,
            inner,
        }
    }

    fn system_prompt(candidates: &[Arc<Role>]) -> String {
        let coworkers = candidates
            .iter()
            .map(|r| format!("- {}: {}", r.name, r.goal))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are the manager of a research crew. For each task you decide which coworker should perform it.

Coworkers:
{}

Respond with ONLY the coworker name, nothing else."#,
            coworkers
        )
    }

    fn task_prompt(request: &StageRequest<'_>) -> String {
        format!(
            "Task '{}' (currently assigned to {}):\n{}\n\nExpected output: {}",
            request.stage, request.role.name, request.instruction, request.expected_output
        )
    }

    /// Parse the manager's answer into one of the candidate roles.
    ///
    /// This handles various output formats:
    /// - Clean output: "Searcher"
    /// - With whitespace or case changes: "  searcher  "
    /// - With extra text: "I would give this to the Searcher."
    fn parse_delegation(output: &str, candidates: &[Arc<Role>]) -> Option<Arc<Role>> {
        let trimmed = output.trim().to_lowercase();
        let by_name = |name: &str| {
            candidates
                .iter()
                .find(|r| r.name.to_lowercase() == name)
                .cloned()
        };

        // First, try exact match
        if let Some(role) = by_name(&trimmed) {
            return Some(role);
        }

        // Split by common delimiters and check each word
        for word in trimmed.split(|c: char| {
            c.is_whitespace() || c == ':' || c == ',' || c == '.' || c == '"' || c == '\''
        }) {
            if let Some(role) = by_name(word.trim()) {
                return Some(role);
            }
        }

        // Check if any candidate name is contained in the output
        candidates
            .iter()
            .find(|r| trimmed.contains(&r.name.to_lowercase()))
            .cloned()
    }

    async fn choose(&self, request: &StageRequest<'_>) -> Result<Option<Arc<Role>>> {
        if !request.role.can_delegate() {
            return Ok(None);
        }

        // A stage that reads the knowledge file stays with roles allowed to
        // read it.
        let needs_file = request.role.can_read_file() || !request.tools.is_empty();
        let candidates: Vec<Arc<Role>> = self
            .crew
            .delegates()
            .into_iter()
            .filter(|r| !needs_file || r.can_read_file())
            .collect();
        if candidates.iter().all(|r| r.name == request.role.name) {
            return Ok(None);
        }

        let answer = match self
            .manager
            .generate_with_system(&Self::system_prompt(&candidates), &Self::task_prompt(request))
            .await
        {
            Ok(answer) => answer,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    stage = request.stage,
                    error = %e,
                    "manager unavailable, keeping declared role"
                );
                return Ok(None);
            }
        };

        let chosen = Self::parse_delegation(&answer, &candidates);
        if chosen.is_none() {
            tracing::warn!(
                stage = request.stage,
                answer = %answer,
                "could not parse manager decision, keeping declared role"
            );
        }
        Ok(chosen)
    }
}

#[async_trait]
impl StageExecutor for ManagerExecutor {
    async fn execute(&self, request: &StageRequest<'_>) -> Result<StageOutcome> {
        match self.choose(request).await? {
            Some(role) if role.name != request.role.name => {
                tracing::info!(
                    stage = request.stage,
                    from = %request.role.name,
                    to = %role.name,
                    "manager delegated stage"
                );
                let delegated = StageRequest {
                    role: &role,
                    ..*request
                };
                self.inner.execute(&delegated).await
            }
            _ => self.inner.execute(request).await,
        }
    }
}
